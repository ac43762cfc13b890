use crate::ipc::error::err;
use crate::ipc::helpers::{mutate_course, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::ScoreEntry;

/// Entry policy: numeric input is floored at 0 and not capped — values over
/// 10 stay as entered so the warning banner can fire. An empty string
/// records an explicit cleared cell; any other text is kept verbatim and
/// coerced to 0 at computation time.
fn entry_from_param(value: &serde_json::Value) -> Option<ScoreEntry> {
    match value {
        serde_json::Value::Number(n) => {
            let v = n.as_f64().unwrap_or(0.0);
            Some(ScoreEntry::Number(if v.is_finite() { v.max(0.0) } else { 0.0 }))
        }
        serde_json::Value::String(s) => {
            if s.trim().is_empty() {
                Some(ScoreEntry::empty())
            } else if let Ok(v) = s.trim().parse::<f64>() {
                Some(ScoreEntry::Number(if v.is_finite() { v.max(0.0) } else { 0.0 }))
            } else {
                Some(ScoreEntry::Text(s.clone()))
            }
        }
        serde_json::Value::Null => Some(ScoreEntry::empty()),
        _ => None,
    }
}

fn handle_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let student_id = required_str(req, "studentId")?;
        let sub_item_id = required_str(req, "subItemId")?.to_string();
        let raw = req
            .params
            .get("value")
            .ok_or_else(|| err(&req.id, "bad_params", "missing params.value", None))?;
        let entry = entry_from_param(raw).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                "params.value must be a number or string",
                None,
            )
        })?;

        let Some(student) = course.students.iter_mut().find(|s| s.id == student_id) else {
            return Err(err(&req.id, "not_found", "student not found", None));
        };
        student.grades.insert(sub_item_id, entry);
        Ok(())
    })
}

fn handle_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let student_id = required_str(req, "studentId")?;
        let sub_item_id = required_str(req, "subItemId")?;
        let Some(student) = course.students.iter_mut().find(|s| s.id == student_id) else {
            return Err(err(&req.id, "not_found", "student not found", None));
        };
        student.grades.remove(sub_item_id);
        Ok(())
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.set" => Some(handle_set(state, req)),
        "grades.clear" => Some(handle_clear(state, req)),
        _ => None,
    }
}
