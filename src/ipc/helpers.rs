use crate::auth;
use crate::error::{AuthError, Error, Result, ValidationError};
use crate::ipc::types::{AppState, Session};
use crate::listview::{Page, PageQuery};
use crate::models::Activity;
use crate::sanitize::escape_html;
use crate::state::Collection;
use crate::store::Store;

/// How a form submit is dispatched: append a new record or overwrite an
/// existing one. Carried explicitly instead of living as ambient state on
/// the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

impl FormMode {
    pub fn from_params(params: &serde_json::Value) -> FormMode {
        match params.get("editId").and_then(|v| v.as_str()) {
            Some(id) if !id.is_empty() => FormMode::Edit(id.to_string()),
            _ => FormMode::Create,
        }
    }
}

pub fn require_str<'a>(params: &'a serde_json::Value, key: &'static str) -> Result<&'a str> {
    let v = params.get(key).and_then(|v| v.as_str()).map(str::trim).unwrap_or("");
    if v.is_empty() {
        return Err(ValidationError::MissingField(key).into());
    }
    Ok(v)
}

pub fn opt_str<'a>(params: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

pub fn require_i64(params: &serde_json::Value, key: &'static str) -> Result<i64> {
    params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| ValidationError::MissingField(key).into())
}

/// Search text, designated field filter, and requested page (defaults to 1).
pub fn page_query(params: &serde_json::Value, filter_key: &str) -> PageQuery {
    PageQuery {
        search: opt_str(params, "search").unwrap_or("").to_string(),
        filter: opt_str(params, filter_key).unwrap_or("").to_string(),
        page: params.get("page").and_then(|v| v.as_i64()).unwrap_or(1),
    }
}

pub fn page_json(page: Page<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "rows": page.rows,
        "currentPage": page.current_page,
        "totalPages": page.total_pages,
        "noRecords": page.rows.is_empty(),
    })
}

/// Splits the store and session out of the app state, failing when no
/// workspace is open or nobody is logged in.
pub fn parts(state: &mut AppState) -> Result<(&mut Store, &mut Session)> {
    let store = state.store.as_mut().ok_or(Error::NoWorkspace)?;
    let session = state
        .session
        .as_mut()
        .ok_or(Error::Auth(AuthError::NotLoggedIn))?;
    Ok((store, session))
}

pub fn session_ref(state: &mut AppState) -> Result<&mut Session> {
    state
        .session
        .as_mut()
        .ok_or_else(|| Error::Auth(AuthError::NotLoggedIn))
}

/// Form-controller write path: refresh the token, then create or overwrite
/// per the form mode. Returns the record id.
pub fn save_record(
    store: &mut Store,
    session: &mut Session,
    collection: Collection,
    mode: &FormMode,
    body: &serde_json::Value,
) -> Result<String> {
    auth::refresh_token(store, &mut session.identity)?;
    match mode {
        FormMode::Create => store.create(&session.identity.owner_id, collection.path(), body),
        FormMode::Edit(id) => {
            store.overwrite(&session.identity.owner_id, collection.path(), id, body)?;
            Ok(id.clone())
        }
    }
}

pub fn delete_record(
    store: &mut Store,
    session: &mut Session,
    collection: Collection,
    id: &str,
) -> Result<()> {
    auth::refresh_token(store, &mut session.identity)?;
    store.delete(&session.identity.owner_id, collection.path(), id)
}

/// Validates and uploads an optional file attachment, returning the blob URL
/// to embed in the record. Runs before the record write: a rejected or
/// failed upload aborts the whole submission.
pub fn upload_attachment(
    store: &Store,
    owner_id: &str,
    collection: Collection,
    rules: crate::validate::FileRules,
    params: &serde_json::Value,
) -> Result<Option<String>> {
    let Some(attachment) = params.get("attachment").filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let path = attachment
        .get("path")
        .and_then(|v| v.as_str())
        .ok_or(ValidationError::MissingField("attachment.path"))?;
    let file_name = attachment
        .get("fileName")
        .and_then(|v| v.as_str())
        .or_else(|| std::path::Path::new(path).file_name().and_then(|n| n.to_str()))
        .unwrap_or("attachment");
    let mime = match attachment.get("mimeType").and_then(|v| v.as_str()) {
        Some(m) => m.to_string(),
        None => crate::validate::mime_from_name(file_name).to_string(),
    };

    let size = std::fs::metadata(path).map_err(Error::Upload)?.len();
    rules.check(&mime, size)?;
    let bytes = std::fs::read(path).map_err(Error::Upload)?;
    let url = store.upload_blob(owner_id, collection.path(), file_name, &bytes)?;
    Ok(Some(url))
}

/// Appends an activity-trail entry. Best-effort: a failed append is logged
/// and never blocks the action that triggered it.
pub fn log_activity(store: &mut Store, session: &Session, action: impl Into<String>) {
    let entry = Activity {
        id: String::new(),
        action: escape_html(&action.into()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    let body = serde_json::to_value(&entry).expect("activity serialize");
    if let Err(e) = store.create(
        &session.identity.owner_id,
        Collection::Activities.path(),
        &body,
    ) {
        tracing::warn!("failed to record activity {:?}: {}", entry.action, e);
    }
}

/// Drains pending pushes into the session mirrors and reports any
/// subscription failures as user-visible notices.
pub fn drain_pushes(store: &mut Store, session: &mut Session) -> Vec<String> {
    session.sync.drain(store, &mut session.state)
}

/// Attaches sync notices to a result when any were raised.
pub fn with_notices(mut result: serde_json::Value, notices: Vec<String>) -> serde_json::Value {
    if !notices.is_empty() {
        result["syncNotices"] = serde_json::json!(notices);
    }
    result
}
