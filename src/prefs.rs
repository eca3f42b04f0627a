//! Client-local state that lives outside the synchronized store: previously
//! used login identifiers (for quick account switching) and the theme
//! preference. Persisted as a small JSON file in the workspace so it
//! survives daemon restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const PREFS_FILE: &str = "local_prefs.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalPrefs {
    pub accounts: Vec<String>,
    pub theme: String,
}

impl Default for LocalPrefs {
    fn default() -> Self {
        LocalPrefs {
            accounts: Vec::new(),
            theme: "light".to_string(),
        }
    }
}

fn prefs_path(workspace: &Path) -> PathBuf {
    workspace.join(PREFS_FILE)
}

impl LocalPrefs {
    /// Missing or unreadable prefs fall back to defaults; prefs are a
    /// convenience, never a reason to block login.
    pub fn load(workspace: &Path) -> LocalPrefs {
        match std::fs::read_to_string(prefs_path(workspace)) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed {}: {}", PREFS_FILE, e);
                LocalPrefs::default()
            }),
            Err(_) => LocalPrefs::default(),
        }
    }

    pub fn save(&self, workspace: &Path) -> std::io::Result<()> {
        let raw = serde_json::to_string_pretty(self).expect("prefs serialize");
        std::fs::write(prefs_path(workspace), raw)
    }

    /// Remembers an identifier once, preserving first-seen order.
    pub fn remember_account(&mut self, email: &str) {
        if !self.accounts.iter().any(|a| a == email) {
            self.accounts.push(email.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_workspace(tag: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "edupaneld-prefs-{}-{}",
            tag,
            uuid::Uuid::new_v4()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn round_trips_and_dedupes_accounts() {
        let ws = temp_workspace("roundtrip");
        let mut prefs = LocalPrefs::load(&ws);
        assert_eq!(prefs.theme, "light");

        prefs.remember_account("a@school.test");
        prefs.remember_account("b@school.test");
        prefs.remember_account("a@school.test");
        prefs.theme = "dark".to_string();
        prefs.save(&ws).expect("save prefs");

        let reloaded = LocalPrefs::load(&ws);
        assert_eq!(reloaded.accounts, vec!["a@school.test", "b@school.test"]);
        assert_eq!(reloaded.theme, "dark");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let ws = temp_workspace("malformed");
        std::fs::write(ws.join(PREFS_FILE), "{not json").expect("write");
        let prefs = LocalPrefs::load(&ws);
        assert!(prefs.accounts.is_empty());
        assert_eq!(prefs.theme, "light");
    }
}
