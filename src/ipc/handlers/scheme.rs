use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{mutate_course, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::{Evaluation, Section, SubItem, Weight};
use serde_json::json;

fn weight_param(req: &Request) -> Result<Option<Weight>, serde_json::Value> {
    match req.params.get("weight") {
        None => Ok(None),
        Some(v) => serde_json::from_value::<Weight>(v.clone())
            .map(Some)
            .map_err(|e| err(&req.id, "bad_params", format!("invalid weight: {e}"), None)),
    }
}

fn find_evaluation<'a>(
    evaluations: &'a mut Vec<Evaluation>,
    req: &Request,
) -> Result<&'a mut Evaluation, serde_json::Value> {
    let id = required_str(req, "evaluationId")?;
    evaluations
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or_else(|| err(&req.id, "not_found", "evaluation not found", None))
}

fn find_section<'a>(
    evaluation: &'a mut Evaluation,
    req: &Request,
) -> Result<&'a mut Section, serde_json::Value> {
    let id = required_str(req, "sectionId")?;
    evaluation
        .sections
        .iter_mut()
        .find(|s| s.id == id)
        .ok_or_else(|| err(&req.id, "not_found", "section not found", None))
}

fn handle_evaluation_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, _req| {
        let mut evaluation = Evaluation::new("Nueva Evaluación", Weight::set(0.0));
        let mut section = Section::new("Exámenes", Weight::set(100.0));
        section.sub_items.push(SubItem::new("Examen 1"));
        evaluation.sections.push(section);
        course.evaluations.push(evaluation);
        Ok(())
    })
}

fn handle_evaluation_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let weight = weight_param(req)?;
        let evaluation = find_evaluation(&mut course.evaluations, req)?;
        if let Some(name) = req.params.get("name").and_then(|v| v.as_str()) {
            evaluation.name = name.to_string();
        }
        if let Some(w) = weight {
            evaluation.weight = w;
        }
        Ok(())
    })
}

fn handle_evaluation_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let id = required_str(req, "evaluationId")?;
        let before = course.evaluations.len();
        course.evaluations.retain(|e| e.id != id);
        if course.evaluations.len() == before {
            return Err(err(&req.id, "not_found", "evaluation not found", None));
        }
        Ok(())
    })
}

fn handle_section_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let evaluation = find_evaluation(&mut course.evaluations, req)?;
        let mut section = Section::new("Nueva Sección", Weight::set(0.0));
        section.sub_items.push(SubItem::new("Item 1"));
        evaluation.sections.push(section);
        Ok(())
    })
}

fn handle_section_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let weight = weight_param(req)?;
        let evaluation = find_evaluation(&mut course.evaluations, req)?;
        let section = find_section(evaluation, req)?;
        if let Some(name) = req.params.get("name").and_then(|v| v.as_str()) {
            section.name = name.to_string();
        }
        if let Some(w) = weight {
            section.weight = w;
        }
        Ok(())
    })
}

/// Deleting a section leaves any grade entries keyed by its former sub-item
/// ids in place; they become inert and stop contributing to every average.
fn handle_section_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let evaluation = find_evaluation(&mut course.evaluations, req)?;
        let id = required_str(req, "sectionId")?;
        let before = evaluation.sections.len();
        evaluation.sections.retain(|s| s.id != id);
        if evaluation.sections.len() == before {
            return Err(err(&req.id, "not_found", "section not found", None));
        }
        Ok(())
    })
}

fn handle_subitem_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let evaluation = find_evaluation(&mut course.evaluations, req)?;
        let section = find_section(evaluation, req)?;
        let name = match req.params.get("name").and_then(|v| v.as_str()) {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => format!("Item {}", section.sub_items.len() + 1),
        };
        section.sub_items.push(SubItem::new(name));
        Ok(())
    })
}

fn handle_subitem_rename(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let evaluation = find_evaluation(&mut course.evaluations, req)?;
        let section = find_section(evaluation, req)?;
        let id = required_str(req, "subItemId")?;
        let name = required_str(req, "name")?.to_string();
        let Some(sub) = section.sub_items.iter_mut().find(|s| s.id == id) else {
            return Err(err(&req.id, "not_found", "sub-item not found", None));
        };
        sub.name = name;
        Ok(())
    })
}

fn handle_subitem_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    mutate_course(state, req, |course, req| {
        let evaluation = find_evaluation(&mut course.evaluations, req)?;
        let section = find_section(evaluation, req)?;
        let id = required_str(req, "subItemId")?;
        let before = section.sub_items.len();
        section.sub_items.retain(|s| s.id != id);
        if section.sub_items.len() == before {
            return Err(err(&req.id, "not_found", "sub-item not found", None));
        }
        Ok(())
    })
}

/// Weight feedback for the whole scheme: the evaluation-level total plus a
/// section-level total per evaluation. Reporting only; nothing is enforced.
fn handle_weight_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let course_id = match required_str(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(course) = state.courses.iter().find(|c| c.id == course_id) else {
        return err(&req.id, "not_found", "course not found", None);
    };

    let evaluations = calc::weight_validity(course.evaluations.iter().map(|e| &e.weight));
    let per_evaluation: Vec<serde_json::Value> = course
        .evaluations
        .iter()
        .map(|e| {
            json!({
                "evaluationId": e.id,
                "sections": calc::weight_validity(e.sections.iter().map(|s| &s.weight)),
            })
        })
        .collect();

    ok(
        &req.id,
        json!({
            "evaluations": evaluations,
            "perEvaluation": per_evaluation,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "evaluations.add" => Some(handle_evaluation_add(state, req)),
        "evaluations.update" => Some(handle_evaluation_update(state, req)),
        "evaluations.delete" => Some(handle_evaluation_delete(state, req)),
        "sections.add" => Some(handle_section_add(state, req)),
        "sections.update" => Some(handle_section_update(state, req)),
        "sections.delete" => Some(handle_section_delete(state, req)),
        "subitems.add" => Some(handle_subitem_add(state, req)),
        "subitems.rename" => Some(handle_subitem_rename(state, req)),
        "subitems.delete" => Some(handle_subitem_delete(state, req)),
        "scheme.weightSummary" => Some(handle_weight_summary(state, req)),
        _ => None,
    }
}
