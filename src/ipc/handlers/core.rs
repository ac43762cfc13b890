use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::migrate;
use crate::store::Store;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "courseCount": state.courses.len(),
        }),
    )
}

/// Open (or create) a workspace and load its course collection. The schema
/// migration runs exactly once here; if any record changed, the normalized
/// collection replaces persisted state before anything else happens.
fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    let store = match Store::open(&path) {
        Ok(s) => s,
        Err(e) => return err(&req.id, "store_open_failed", format!("{e:#}"), None),
    };

    let (courses, migrated_count) = migrate::migrate_courses(store.load_courses());
    if migrated_count > 0 {
        if let Err(e) = store.save_courses(&courses) {
            eprintln!("gradebookd: failed to persist migrated courses: {e:#}");
        }
    }

    state.workspace = Some(path.clone());
    state.store = Some(store);
    state.courses = courses;

    ok(
        &req.id,
        json!({
            "workspacePath": path.to_string_lossy(),
            "courseCount": state.courses.len(),
            "migratedCount": migrated_count,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
