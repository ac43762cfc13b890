use crate::ipc::error::err;
use crate::ipc::helpers::{mutate_course, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Student;

fn handle_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let name = required_str(req, "name")?;
        course.students.push(Student::new(name));
        Ok(())
    })
}

fn handle_rename(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let id = required_str(req, "studentId")?;
        let name = required_str(req, "name")?.to_string();
        let Some(student) = course.students.iter_mut().find(|s| s.id == id) else {
            return Err(err(&req.id, "not_found", "student not found", None));
        };
        student.name = name;
        Ok(())
    })
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let id = required_str(req, "studentId")?;
        let before = course.students.len();
        course.students.retain(|s| s.id != id);
        if course.students.len() == before {
            return Err(err(&req.id, "not_found", "student not found", None));
        }
        Ok(())
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.add" => Some(handle_add(state, req)),
        "students.rename" => Some(handle_rename(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
