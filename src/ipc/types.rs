use std::path::PathBuf;

use serde::Deserialize;

use crate::model::Course;
use crate::store::Store;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// In-memory state of the sidecar. The course collection is authoritative
/// while the process runs; the store mirrors it on every mutation.
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    pub courses: Vec<Course>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            workspace: None,
            store: None,
            courses: Vec::new(),
        }
    }
}
