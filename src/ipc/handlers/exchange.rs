use anyhow::{anyhow, Context};
use chrono::Utc;
use serde_json::json;
use std::path::Path;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{persist, require_workspace, required_str};
use crate::ipc::types::{AppState, Request};
use crate::migrate;
use crate::model::Course;

fn write_backup(courses: &[Course], out_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let blob = serde_json::to_string(courses).context("failed to serialize courses")?;
    std::fs::write(out_path, blob).with_context(|| {
        format!(
            "failed to write backup file {}",
            out_path.to_string_lossy()
        )
    })?;
    Ok(())
}

/// Parse a backup file into a course collection. The only structural gate
/// is "is the top-level value an array" — anything else is a user-facing
/// error and leaves state untouched.
fn read_backup(in_path: &Path) -> anyhow::Result<Vec<Course>> {
    let text = std::fs::read_to_string(in_path)
        .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).context("backup file is not valid JSON")?;
    let serde_json::Value::Array(items) = value else {
        return Err(anyhow!("backup file must contain a JSON array of courses"));
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value::<Course>(item).context("invalid course record"))
        .collect()
}

/// Export the verbatim course array as a downloadable JSON file, the same
/// shape the store persists.
fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let out_path = match required_str(req, "outPath") {
        Ok(v) => Path::new(v).to_path_buf(),
        Err(resp) => return resp,
    };

    match write_backup(&state.courses, &out_path) {
        Ok(()) => ok(
            &req.id,
            json!({
                "outPath": out_path.to_string_lossy(),
                "courseCount": state.courses.len(),
                "exportedAt": Utc::now().to_rfc3339(),
            }),
        ),
        Err(e) => err(&req.id, "export_failed", format!("{e:#}"), None),
    }
}

/// Import wholesale-replaces the collection — no merge. Legacy-shape
/// records in the backup are migrated on the way in, so old exports load
/// cleanly into the current schema.
fn handle_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    if let Err(resp) = require_workspace(state, req) {
        return resp;
    }
    let in_path = match required_str(req, "inPath") {
        Ok(v) => Path::new(v).to_path_buf(),
        Err(resp) => return resp,
    };

    let imported = match read_backup(&in_path) {
        Ok(courses) => courses,
        Err(e) => return err(&req.id, "import_failed", format!("{e:#}"), None),
    };

    let (courses, migrated_count) = migrate::migrate_courses(imported);
    state.courses = courses;
    persist(state);

    ok(
        &req.id,
        json!({
            "courseCount": state.courses.len(),
            "migratedCount": migrated_count,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "exchange.export" => Some(handle_export(state, req)),
        "exchange.import" => Some(handle_import(state, req)),
        _ => None,
    }
}
