//! Local document store standing in for the hosted backend: generic JSON
//! documents grouped by owner and collection, an accounts table for
//! authentication, blob uploads, and a push queue. Every mutation enqueues a
//! push for its `(owner, collection)` pair; a subscriber later receives the
//! entire current collection, never a diff.

use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AuthError, Error, Result};

const DB_FILE: &str = "edupanel.sqlite3";

/// Notification that a collection changed. Carries no record data; the
/// subscriber re-reads the full collection on delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    pub owner_id: String,
    pub collection: String,
}

pub struct Store {
    conn: Connection,
    workspace: PathBuf,
    pending: VecDeque<PushEvent>,
}

impl Store {
    pub fn open(workspace: &Path) -> anyhow::Result<Store> {
        std::fs::create_dir_all(workspace)?;
        let conn = Connection::open(workspace.join(DB_FILE))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents(
                owner_id TEXT NOT NULL,
                collection TEXT NOT NULL,
                id TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY(owner_id, collection, id)
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_owner_collection
             ON documents(owner_id, collection)",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts(
                email TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL UNIQUE,
                salt TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Store {
            conn,
            workspace: workspace.to_path_buf(),
            pending: VecDeque::new(),
        })
    }

    // ----- documents -----

    /// Appends a record under a server-assigned id and returns the id.
    pub fn create(
        &mut self,
        owner_id: &str,
        collection: &str,
        body: &serde_json::Value,
    ) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO documents(owner_id, collection, id, body) VALUES(?, ?, ?, ?)",
            (owner_id, collection, &id, body.to_string()),
        )?;
        self.mark_changed(owner_id, collection);
        Ok(id)
    }

    /// Full-record overwrite at a known id; creates the document when absent
    /// (set semantics, no partial patch).
    pub fn overwrite(
        &mut self,
        owner_id: &str,
        collection: &str,
        id: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO documents(owner_id, collection, id, body) VALUES(?, ?, ?, ?)",
            (owner_id, collection, id, body.to_string()),
        )?;
        self.mark_changed(owner_id, collection);
        Ok(())
    }

    /// Deleting an absent document is a no-op, but still pushes.
    pub fn delete(&mut self, owner_id: &str, collection: &str, id: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM documents WHERE owner_id = ? AND collection = ? AND id = ?",
            (owner_id, collection, id),
        )?;
        self.mark_changed(owner_id, collection);
        Ok(())
    }

    /// Reads the entire collection, each body carrying its id, in insertion
    /// (rowid) order.
    pub fn read_all(&self, owner_id: &str, collection: &str) -> Result<Vec<serde_json::Value>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, body FROM documents
             WHERE owner_id = ? AND collection = ?
             ORDER BY rowid",
        )?;
        let rows = stmt.query_map((owner_id, collection), |row| {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            Ok((id, body))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, body) = row?;
            let mut value: serde_json::Value = serde_json::from_str(&body)
                .map_err(|e| Error::Remote(format!("corrupt document {collection}/{id}: {e}")))?;
            if let Some(obj) = value.as_object_mut() {
                obj.insert("id".to_string(), serde_json::Value::String(id));
            }
            out.push(value);
        }
        Ok(out)
    }

    pub fn read(
        &self,
        owner_id: &str,
        collection: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE owner_id = ? AND collection = ? AND id = ?",
                (owner_id, collection, id),
                |r| r.get(0),
            )
            .optional()?;
        match body {
            Some(raw) => {
                let mut value: serde_json::Value = serde_json::from_str(&raw)
                    .map_err(|e| Error::Remote(format!("corrupt document {collection}/{id}: {e}")))?;
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("id".to_string(), serde_json::Value::String(id.to_string()));
                }
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn mark_changed(&mut self, owner_id: &str, collection: &str) {
        let ev = PushEvent {
            owner_id: owner_id.to_string(),
            collection: collection.to_string(),
        };
        // Coalesce back-to-back writes to the same collection, like a backend
        // batching rapid changes into one delivery.
        if self.pending.back() != Some(&ev) {
            self.pending.push_back(ev);
        }
    }

    /// Drains queued pushes in delivery order.
    pub fn take_pushes(&mut self) -> Vec<PushEvent> {
        self.pending.drain(..).collect()
    }

    // ----- blobs -----

    /// Stores uploaded bytes under the owner's blob area and returns the URL
    /// embedded into the dependent record.
    pub fn upload_blob(
        &self,
        owner_id: &str,
        collection: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let safe_name: String = file_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let rel = format!("blobs/{owner_id}/{collection}/{stamp}_{safe_name}");
        let dest = self.workspace.join(&rel);
        (|| -> std::io::Result<()> {
            std::fs::create_dir_all(dest.parent().expect("blob path has parent"))?;
            let mut f = std::fs::File::create(&dest)?;
            f.write_all(bytes)?;
            Ok(())
        })()
        .map_err(Error::Upload)?;
        Ok(format!("blob://{rel}"))
    }

    // ----- accounts -----

    pub fn create_account(&mut self, email: &str, password: &str) -> Result<String> {
        let exists: Option<String> = self
            .conn
            .query_row("SELECT owner_id FROM accounts WHERE email = ?", [email], |r| r.get(0))
            .optional()?;
        if exists.is_some() {
            return Err(AuthError::IdentityExists(email.to_string()).into());
        }

        let owner_id = Uuid::new_v4().to_string();
        let salt = Uuid::new_v4().to_string();
        let hash = password_digest(&salt, password);
        self.conn.execute(
            "INSERT INTO accounts(email, owner_id, salt, password_hash, created_at)
             VALUES(?, ?, ?, ?, ?)",
            (email, &owner_id, &salt, &hash, chrono::Utc::now().to_rfc3339()),
        )?;
        Ok(owner_id)
    }

    pub fn verify_account(&self, email: &str, password: &str) -> Result<String> {
        let row: Option<(String, String, String)> = self
            .conn
            .query_row(
                "SELECT owner_id, salt, password_hash FROM accounts WHERE email = ?",
                [email],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .optional()?;
        let Some((owner_id, salt, stored)) = row else {
            return Err(AuthError::UnknownIdentity(email.to_string()).into());
        };
        if password_digest(&salt, password) != stored {
            return Err(AuthError::InvalidCredential.into());
        }
        Ok(owner_id)
    }

    /// Token refresh re-checks that the account still exists instead of
    /// trusting a cached credential.
    pub fn account_exists(&self, owner_id: &str) -> Result<bool> {
        let row: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM accounts WHERE owner_id = ?", [owner_id], |r| r.get(0))
            .optional()?;
        Ok(row.is_some())
    }
}

fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
