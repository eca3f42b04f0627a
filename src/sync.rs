//! Keeps the session mirrors current. One subscription per collection path
//! is opened at login and torn down at logout; each delivery replaces the
//! corresponding mirror wholesale and re-triggers the downstream views
//! (list revisions, analytics invalidation) via `SessionState::apply_push`.

use std::collections::HashSet;

use crate::state::{Collection, SessionState};
use crate::store::Store;

pub struct SyncEngine {
    owner_id: String,
    subscriptions: HashSet<Collection>,
}

impl SyncEngine {
    /// Opens one subscription per collection for the freshly authenticated
    /// owner. A previous session's engine is always stopped first, so a
    /// stale subscription can never feed the new identity's state.
    pub fn start(owner_id: &str) -> SyncEngine {
        SyncEngine {
            owner_id: owner_id.to_string(),
            subscriptions: Collection::ALL.into_iter().collect(),
        }
    }

    /// Tears down every subscription. Pushes still queued in the store are
    /// delivered to nobody afterwards.
    pub fn stop(&mut self) {
        self.subscriptions.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Delivers queued pushes in order. Each one re-reads the entire current
    /// collection and replaces the mirror. A failed read is logged and
    /// reported as a notice without disturbing the other subscriptions.
    pub fn drain(&mut self, store: &mut Store, state: &mut SessionState) -> Vec<String> {
        let mut notices = Vec::new();
        for push in store.take_pushes() {
            // Pushes for another identity (or queued before logout) are
            // dropped, never applied.
            if push.owner_id != self.owner_id {
                continue;
            }
            let Some(collection) = Collection::from_path(&push.collection) else {
                continue;
            };
            if !self.subscriptions.contains(&collection) {
                continue;
            }
            match store.read_all(&push.owner_id, collection.path()) {
                Ok(records) => state.apply_push(collection, records),
                Err(e) => {
                    tracing::warn!("sync failed for {}: {}", collection.path(), e);
                    notices.push(format!("sync failed for {}: {}", collection.path(), e));
                }
            }
        }
        notices
    }
}
