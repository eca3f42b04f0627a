use std::path::PathBuf;

use serde::Deserialize;

use crate::prefs::LocalPrefs;
use crate::state::{Identity, SessionState};
use crate::store::Store;
use crate::sync::SyncEngine;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything owned by one authenticated login: the identity, the mirrored
/// collections, and the subscriptions keeping them current. Dropped in its
/// entirety on logout.
pub struct Session {
    pub identity: Identity,
    pub state: SessionState,
    pub sync: SyncEngine,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<Store>,
    pub prefs: Option<LocalPrefs>,
    pub session: Option<Session>,
}

impl AppState {
    pub fn new() -> AppState {
        AppState {
            workspace: None,
            store: None,
            prefs: None,
            session: None,
        }
    }
}
