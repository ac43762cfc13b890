use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{mutate_course, persist, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Course;
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    ok(&req.id, json!({ "courses": state.courses }))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let name = match required_str(req, "name") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };

    let course = Course::with_default_scheme(name);
    state.courses.push(course.clone());
    persist(state);
    ok(&req.id, json!({ "course": course }))
}

fn handle_rename(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let name = required_str(req, "name")?;
        course.name = name.to_string();
        Ok(())
    })
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v.to_string(),
        Err(resp) => return resp,
    };

    let before = state.courses.len();
    state.courses.retain(|c| c.id != course_id);
    if state.courses.len() == before {
        return err(&req.id, "not_found", "course not found", None);
    }
    persist(state);
    ok(&req.id, json!({ "deleted": course_id }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" => Some(handle_list(state, req)),
        "courses.create" => Some(handle_create(state, req)),
        "courses.rename" => Some(handle_rename(state, req)),
        "courses.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
