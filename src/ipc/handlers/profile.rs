use serde_json::json;

use crate::auth;
use crate::error::Result;
use crate::ipc::error::{fail, ok};
use crate::ipc::handlers::auth::PROFILE_DOC_ID;
use crate::ipc::helpers::{
    drain_pushes, log_activity, opt_str, parts, require_str, session_ref, upload_attachment,
    with_notices,
};
use crate::ipc::types::{AppState, Request, Session};
use crate::models::Profile;
use crate::sanitize::escape_html;
use crate::state::Collection;
use crate::store::Store;
use crate::validate;

fn current_profile(session: &Session) -> Profile {
    session
        .state
        .profile()
        .cloned()
        .unwrap_or_else(|| Profile::initial(&session.identity.email))
}

fn write_profile(store: &mut Store, session: &mut Session, profile: &Profile) -> Result<()> {
    auth::refresh_token(store, &mut session.identity)?;
    let body = serde_json::to_value(profile).expect("profile serialize");
    store.overwrite(
        &session.identity.owner_id,
        Collection::Profile.path(),
        PROFILE_DOC_ID,
        &body,
    )
}

fn profile_get(state: &mut AppState) -> Result<serde_json::Value> {
    let session = session_ref(state)?;
    let profile = current_profile(session);
    Ok(json!({
        "profile": profile,
        "stats": {
            "classes": session.state.classes().len(),
            "students": session.state.students().len(),
            "homework": session.state.homework().len(),
        },
    }))
}

fn profile_save(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let (store, session) = parts(state)?;
    let mut profile = current_profile(session);

    if let Some(name) = opt_str(&req.params, "name") {
        profile.name = escape_html(name);
    }
    if let Some(bio) = opt_str(&req.params, "bio") {
        profile.bio = escape_html(bio);
    }
    if let Some(phone) = opt_str(&req.params, "phone") {
        profile.phone = escape_html(phone);
    }
    if let Some(address) = opt_str(&req.params, "address") {
        profile.address = escape_html(address);
    }
    if let Some(subjects) = req.params.get("subjects").and_then(|v| v.as_array()) {
        profile.subjects = subjects
            .iter()
            .filter_map(|s| s.as_str())
            .map(|s| escape_html(s.trim()))
            .filter(|s| !s.is_empty())
            .collect();
    }
    // The address of record never drifts from the authenticated identity.
    profile.email = session.identity.email.clone();

    let owner_id = session.identity.owner_id.clone();
    if let Some(url) = upload_attachment(
        store,
        &owner_id,
        Collection::Profile,
        validate::PROFILE_PHOTO,
        &req.params,
    )? {
        profile.photo_url = url;
    }

    write_profile(store, session, &profile)?;
    log_activity(store, session, "Updated profile");
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "profile": profile }), notices))
}

/// Theme-only update path: persists to both the profile document and the
/// workspace-local prefs so the choice survives before the next login.
fn profile_theme(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let theme = require_str(&req.params, "theme")?.to_string();

    if let Some(prefs) = state.prefs.as_mut() {
        prefs.theme = theme.clone();
        if let Some(ws) = state.workspace.as_ref() {
            if let Err(e) = prefs.save(ws) {
                tracing::warn!("failed to persist theme preference: {e}");
            }
        }
    }

    let (store, session) = parts(state)?;
    let mut profile = current_profile(session);
    profile.theme = theme.clone();
    write_profile(store, session, &profile)?;
    let notices = drain_pushes(store, session);
    Ok(with_notices(json!({ "theme": theme }), notices))
}

fn profile_notifications(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let (store, session) = parts(state)?;
    let mut profile = current_profile(session);
    if let Some(homework) = req.params.get("homework").and_then(|v| v.as_bool()) {
        profile.notifications.homework = homework;
    }
    if let Some(students) = req.params.get("students").and_then(|v| v.as_bool()) {
        profile.notifications.students = students;
    }
    write_profile(store, session, &profile)?;
    let notices = drain_pushes(store, session);
    Ok(with_notices(
        json!({ "notifications": profile.notifications }),
        notices,
    ))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "profile.get" => profile_get(state),
        "profile.save" => profile_save(state, req),
        "profile.theme" => profile_theme(state, req),
        "profile.notifications" => profile_notifications(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
