use serde_json::json;

use crate::error::Result;
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{
    delete_record, drain_pushes, log_activity, parts, require_str, save_record, session_ref,
    with_notices, FormMode,
};
use crate::ipc::types::{AppState, Request};
use crate::models::Class;
use crate::sanitize::escape_html;
use crate::state::Collection;

fn classes_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let name = escape_html(require_str(&req.params, "name")?);
    let mode = FormMode::from_params(&req.params);
    let (store, session) = parts(state)?;

    let body = serde_json::to_value(Class {
        id: String::new(),
        name: name.clone(),
    })
    .expect("class serialize");
    let class_id = save_record(store, session, Collection::Classes, &mode, &body)?;

    let action = match mode {
        FormMode::Create => format!("Added class: {name}"),
        FormMode::Edit(_) => format!("Updated class: {name}"),
    };
    log_activity(store, session, action);
    let notices = drain_pushes(store, session);
    Ok(with_notices(
        json!({
            "classId": class_id,
            "revision": session.state.revision(Collection::Classes),
        }),
        notices,
    ))
}

/// Simple list-view variant: no search, no pagination.
fn classes_list(state: &mut AppState) -> Result<serde_json::Value> {
    let session = session_ref(state)?;
    let rows: Vec<serde_json::Value> = session
        .state
        .classes()
        .iter()
        .map(|c| json!({ "id": c.id, "name": c.name }))
        .collect();
    let no_records = rows.is_empty();
    Ok(json!({ "classes": rows, "noRecords": no_records }))
}

fn classes_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let class_id = require_str(&req.params, "classId")?.to_string();
    let (store, session) = parts(state)?;

    delete_record(store, session, Collection::Classes, &class_id)?;
    log_activity(store, session, format!("Deleted class ID: {class_id}"));
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "ok": true }), notices))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "classes.save" => classes_save(state, req),
        "classes.list" => classes_list(state),
        "classes.delete" => classes_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
