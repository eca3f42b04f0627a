use serde_json::json;

use crate::error::Result;
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{
    delete_record, drain_pushes, log_activity, parts, require_str, save_record, session_ref,
    with_notices, FormMode,
};
use crate::ipc::types::{AppState, Request};
use crate::models::Authority;
use crate::sanitize::escape_html;
use crate::state::Collection;

fn authorities_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let role = escape_html(require_str(&req.params, "role")?);
    let permissions: Vec<String> = req
        .params
        .get("permissions")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|p| p.as_str())
                .map(escape_html)
                .collect()
        })
        .unwrap_or_default();
    let mode = FormMode::from_params(&req.params);
    let (store, session) = parts(state)?;

    // Grants are recorded against the signed-in identity's address.
    let email = session.identity.email.clone();
    let body = serde_json::to_value(Authority {
        id: String::new(),
        email: email.clone(),
        role: role.clone(),
        permissions,
    })
    .expect("authority serialize");
    let authority_id = save_record(store, session, Collection::Authorities, &mode, &body)?;

    let action = match mode {
        FormMode::Create => format!("Assigned authority: {role} to {email}"),
        FormMode::Edit(_) => format!("Updated authority: {role} for {email}"),
    };
    log_activity(store, session, action);
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "authorityId": authority_id }), notices))
}

fn authorities_list(state: &mut AppState) -> Result<serde_json::Value> {
    let session = session_ref(state)?;
    let rows: Vec<serde_json::Value> = session
        .state
        .authorities()
        .iter()
        .map(|a| {
            json!({
                "id": a.id,
                "email": a.email,
                "role": a.role,
                "permissions": a.permissions,
            })
        })
        .collect();
    let no_records = rows.is_empty();
    Ok(json!({ "rows": rows, "noRecords": no_records }))
}

fn authorities_delete(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let authority_id = require_str(&req.params, "authorityId")?.to_string();
    let (store, session) = parts(state)?;

    delete_record(store, session, Collection::Authorities, &authority_id)?;
    log_activity(store, session, format!("Deleted authority ID: {authority_id}"));
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "ok": true }), notices))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "authorities.save" => authorities_save(state, req),
        "authorities.list" => authorities_list(state),
        "authorities.delete" => authorities_delete(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
