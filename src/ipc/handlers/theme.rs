use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "no workspace selected", None);
    };
    ok(&req.id, json!({ "dark": store.theme_dark() }))
}

fn handle_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.store.as_ref() else {
        return err(&req.id, "no_workspace", "no workspace selected", None);
    };
    let Some(dark) = req.params.get("dark").and_then(|v| v.as_bool()) else {
        return err(&req.id, "bad_params", "missing params.dark", None);
    };
    if let Err(e) = store.set_theme_dark(dark) {
        eprintln!("gradebookd: failed to persist theme flag: {e:#}");
    }
    ok(&req.id, json!({ "dark": dark }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "theme.get" => Some(handle_get(state, req)),
        "theme.set" => Some(handle_set(state, req)),
        _ => None,
    }
}
