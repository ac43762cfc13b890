use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::model::Course;
use serde_json::json;

pub fn require_workspace(state: &AppState, req: &Request) -> Result<(), serde_json::Value> {
    if state.store.is_some() {
        Ok(())
    } else {
        Err(err(&req.id, "no_workspace", "no workspace selected", None))
    }
}

pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing params.{}", key), None))
}

/// Mirror the in-memory collection to the store. Persistence failures are
/// logged and swallowed: local data is non-critical and the in-memory
/// collection stays authoritative for the session.
pub fn persist(state: &AppState) {
    if let Some(store) = state.store.as_ref() {
        if let Err(e) = store.save_courses(&state.courses) {
            eprintln!("gradebookd: failed to persist courses: {e:#}");
        }
    }
}

/// Standard mutation path: address a course by `params.courseId`, apply one
/// in-place edit, rewrite the whole persisted collection, and answer with
/// the updated course record.
pub fn mutate_course<F>(state: &mut AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&mut Course, &Request) -> Result<(), serde_json::Value>,
{
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };

    let Some(course) = state.courses.iter_mut().find(|c| c.id == course_id) else {
        return err(&req.id, "not_found", "course not found", None);
    };
    if let Err(resp) = f(course, req) {
        return resp;
    }
    let updated = course.clone();

    persist(state);
    ok(&req.id, json!({ "course": updated }))
}
