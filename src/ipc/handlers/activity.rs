use serde_json::json;

use crate::error::Result;
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{opt_str, session_ref};
use crate::ipc::types::{AppState, Request};
use crate::listview::contains_ci;

/// Read-only view of the append-only activity trail, newest first, with a
/// free-text search and an action-kind filter (the leading verb, e.g.
/// "Added" or "Deleted").
fn activity_list(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let search = opt_str(&req.params, "search").unwrap_or("").trim().to_lowercase();
    let kind = opt_str(&req.params, "kind").unwrap_or("");
    let session = session_ref(state)?;

    let mut entries: Vec<_> = session
        .state
        .activities()
        .iter()
        .filter(|a| search.is_empty() || contains_ci(&a.action, &search))
        .filter(|a| {
            kind.is_empty() || a.action.split_whitespace().next() == Some(kind)
        })
        .collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let rows: Vec<serde_json::Value> = entries
        .into_iter()
        .map(|a| json!({ "id": a.id, "action": a.action, "timestamp": a.timestamp }))
        .collect();
    let no_records = rows.is_empty();
    Ok(json!({ "rows": rows, "noRecords": no_records }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "activity.list" => Some(match activity_list(state, req) {
            Ok(value) => ok(&req.id, value),
            Err(e) => fail(&req.id, &e),
        }),
        _ => None,
    }
}
