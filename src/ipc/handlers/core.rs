use std::path::PathBuf;

use serde_json::json;

use crate::error::Result;
use crate::ipc::error::{err, fail, ok};
use crate::ipc::helpers::{log_activity, parts, with_notices};
use crate::ipc::types::{AppState, Request};
use crate::prefs::LocalPrefs;
use crate::store::Store;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "loggedIn": state.session.as_ref().map(|s| s.identity.email.clone()),
            "syncActive": state.session.as_ref().map(|s| s.sync.is_active()).unwrap_or(false),
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match Store::open(&path) {
        Ok(store) => {
            // Switching workspaces invalidates any live session.
            if let Some(mut session) = state.session.take() {
                session.sync.stop();
            }
            state.prefs = Some(LocalPrefs::load(&path));
            state.store = Some(store);
            state.workspace = Some(path.clone());
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "store_open_failed", format!("{e:?}"), None),
    }
}

fn data_export(state: &mut AppState) -> Result<serde_json::Value> {
    let (store, session) = parts(state)?;
    let snapshot = json!({
        "classes": session.state.classes(),
        "students": session.state.students(),
        "homework": session.state.homework(),
        "attendance": session.state.attendance(),
        "sessionalMarks": session.state.sessional_marks(),
        "profile": session.state.profile(),
        "activities": session.state.activities(),
        "authorities": session.state.authorities(),
        "exportedAt": chrono::Utc::now().to_rfc3339(),
    });
    log_activity(store, session, "Exported teacher data");
    let notices = session.sync.drain(store, &mut session.state);
    Ok(with_notices(json!({ "data": snapshot }), notices))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "data.export" => Some(match data_export(state) {
            Ok(result) => ok(&req.id, result),
            Err(e) => fail(&req.id, &e),
        }),
        _ => None,
    }
}
