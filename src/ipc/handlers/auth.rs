use serde_json::json;

use crate::auth;
use crate::error::{Error, Result};
use crate::ipc::error::{fail, ok};
use crate::ipc::helpers::{log_activity, opt_str, require_str, with_notices};
use crate::ipc::types::{AppState, Request, Session};
use crate::models::Profile;
use crate::state::{Collection, Identity, SessionState};
use crate::store::Store;
use crate::sync::SyncEngine;

/// Fixed document id for the per-owner profile singleton.
pub const PROFILE_DOC_ID: &str = "profile";

fn open_session(state: &mut AppState, identity: Identity) -> Result<serde_json::Value> {
    // A previous identity's subscriptions must never feed the new session.
    if let Some(mut old) = state.session.take() {
        old.sync.stop();
    }

    let store = state.store.as_mut().ok_or(Error::NoWorkspace)?;
    if let Some(prefs) = state.prefs.as_mut() {
        prefs.remember_account(&identity.email);
        if let Some(ws) = state.workspace.as_ref() {
            if let Err(e) = prefs.save(ws) {
                tracing::warn!("failed to persist local prefs: {e}");
            }
        }
    }

    let sync = SyncEngine::start(&identity.owner_id);
    let mut session = Session {
        identity,
        state: SessionState::default(),
        sync,
    };

    // First login seeds the profile singleton with defaults; later logins
    // keep whatever the teacher has saved since.
    let owner = session.identity.owner_id.clone();
    if store.read(&owner, Collection::Profile.path(), PROFILE_DOC_ID)?.is_none() {
        let profile = Profile::initial(&session.identity.email);
        let body = serde_json::to_value(&profile).expect("profile serialize");
        store.overwrite(&owner, Collection::Profile.path(), PROFILE_DOC_ID, &body)?;
        log_activity(store, &session, "Initialized profile");
    }

    // Prime every mirror so the dashboard renders from current data.
    for collection in crate::state::Collection::ALL {
        match store.read_all(&owner, collection.path()) {
            Ok(records) => session.state.apply_push(collection, records),
            Err(e) => tracing::warn!("initial load failed for {}: {}", collection.path(), e),
        }
    }
    let notices = session.sync.drain(store, &mut session.state);

    let result = with_notices(
        json!({
            "ownerId": session.identity.owner_id,
            "email": session.identity.email,
            "profile": session.state.profile(),
        }),
        notices,
    );
    state.session = Some(session);
    Ok(result)
}

fn auth_register(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let email = require_str(&req.params, "email")?.to_string();
    let password = require_str(&req.params, "password")?.to_string();
    let confirm = opt_str(&req.params, "confirmPassword").map(str::to_string);

    let store = state.store.as_mut().ok_or(Error::NoWorkspace)?;
    let identity = auth::register(store, &email, &password, confirm.as_deref())?;
    open_session(state, identity)
}

fn auth_login(state: &mut AppState, req: &Request) -> Result<serde_json::Value> {
    let email = require_str(&req.params, "email")?.to_string();
    let password = require_str(&req.params, "password")?.to_string();

    let store: &Store = state.store.as_ref().ok_or(Error::NoWorkspace)?;
    let identity = auth::login(store, &email, &password)?;
    open_session(state, identity)
}

fn auth_logout(state: &mut AppState) -> Result<serde_json::Value> {
    let Some(mut session) = state.session.take() else {
        return Err(crate::error::AuthError::NotLoggedIn.into());
    };
    session.sync.stop();
    tracing::info!("logout for {}", session.identity.email);
    Ok(json!({ "ok": true }))
}

fn auth_accounts(state: &mut AppState) -> Result<serde_json::Value> {
    let prefs = state.prefs.as_ref().ok_or(Error::NoWorkspace)?;
    Ok(json!({
        "accounts": prefs.accounts,
        "theme": prefs.theme,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "auth.register" => auth_register(state, req),
        "auth.login" => auth_login(state, req),
        "auth.logout" => auth_logout(state),
        "auth.accounts" => auth_accounts(state),
        _ => return None,
    };
    Some(match result {
        Ok(value) => ok(&req.id, value),
        Err(e) => fail(&req.id, &e),
    })
}
