use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::Course;
use serde_json::json;

fn find_course<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a Course, serde_json::Value> {
    require_workspace(state, req)?;
    let course_id = required_str(req, "courseId")?;
    state
        .courses
        .iter()
        .find(|c| c.id == course_id)
        .ok_or_else(|| err(&req.id, "not_found", "course not found", None))
}

/// Per-student view of one evaluation: every section average, the weighted
/// evaluation grade, and the over-threshold warning flag. Derived from
/// current state on every call; nothing here is ever persisted.
fn handle_evaluation(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course = match find_course(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let evaluation_id = match required_str(req, "evaluationId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(evaluation) = course.evaluations.iter().find(|e| e.id == evaluation_id) else {
        return err(&req.id, "not_found", "evaluation not found", None);
    };

    let rows: Vec<serde_json::Value> = course
        .students
        .iter()
        .map(|student| {
            let section_averages: Vec<serde_json::Value> = evaluation
                .sections
                .iter()
                .map(|s| {
                    json!({
                        "sectionId": s.id,
                        "average": calc::section_average(s, student),
                    })
                })
                .collect();
            let has_warning = evaluation
                .sections
                .iter()
                .any(|s| calc::score_warning(s, student));
            json!({
                "studentId": student.id,
                "name": student.name,
                "sectionAverages": section_averages,
                "grade": calc::evaluation_grade(evaluation, student),
                "hasWarning": has_warning,
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "evaluationId": evaluation.id,
            "weights": calc::weight_validity(evaluation.sections.iter().map(|s| &s.weight)),
            "students": rows,
        }),
    )
}

/// Final-summary view: per-evaluation grades and the weighted course grade
/// for every student, plus the pass/fail stats block.
fn handle_course(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course = match find_course(state, req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let rows: Vec<serde_json::Value> = course
        .students
        .iter()
        .map(|student| {
            let evaluation_grades: Vec<serde_json::Value> = course
                .evaluations
                .iter()
                .map(|e| {
                    json!({
                        "evaluationId": e.id,
                        "grade": calc::evaluation_grade(e, student),
                    })
                })
                .collect();
            json!({
                "studentId": student.id,
                "name": student.name,
                "evaluationGrades": evaluation_grades,
                "courseGrade": calc::course_grade(course, student),
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "courseId": course.id,
            "weights": calc::weight_validity(course.evaluations.iter().map(|e| &e.weight)),
            "stats": calc::course_stats(course),
            "students": rows,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "summary.evaluation" => Some(handle_evaluation(state, req)),
        "summary.course" => Some(handle_course(state, req)),
        _ => None,
    }
}
