//! Persistent session store backed by SQLite
//!
//! The browser-storage analog: a `sessions` table keyed by session id with
//! the session value as a JSON column, plus a `settings` table holding the
//! API key, the active session id, and the selected voice. Every mutation
//! persists synchronously; there is exactly one logical actor, so no
//! locking beyond SQLite's own.

use crate::error::{Result, TopikaError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;

pub mod types;
pub use types::{ChatSession, MessageRole, MessageTokens, SessionSummary, StoredMessage};

/// Settings key for the stored API key
const SETTING_API_KEY: &str = "api_key";
/// Settings key for the active session id
const SETTING_ACTIVE_SESSION: &str = "active_session";
/// Settings key for the selected voice id
const SETTING_VOICE: &str = "voice";

/// Storage backend for chat sessions and client settings
pub struct SessionStore {
    db_path: PathBuf,
}

impl SessionStore {
    /// Create a new store in the user's data directory
    ///
    /// The path can be overridden via the `TOPIKA_STORE_DB` environment
    /// variable, which makes it easy to point the binary at a test DB
    /// without changing the application data dir.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("TOPIKA_STORE_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("io", "topika", "topika")
            .ok_or_else(|| TopikaError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;

        let db_path = data_dir.join("store.db");
        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Create a store at an explicit database path
    ///
    /// Primarily useful for tests where the default application data
    /// directory is not desirable.
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| TopikaError::Storage(e.to_string()))?;
        }

        let store = Self { db_path };
        store.init()?;
        Ok(store)
    }

    /// Directory for synthesized audio files, created on demand
    ///
    /// Lives next to the database so audio follows the store override.
    pub fn audio_dir(&self) -> Result<PathBuf> {
        let dir = self
            .db_path
            .parent()
            .map(|p| p.join("audio"))
            .ok_or_else(|| TopikaError::Storage("Store path has no parent directory".into()))?;
        std::fs::create_dir_all(&dir)
            .context("Failed to create audio directory")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;
        Ok(dir)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| TopikaError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                data JSON NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create sessions table")
        .map_err(|e| TopikaError::Storage(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create settings table")
        .map_err(|e| TopikaError::Storage(e.to_string()))?;

        Ok(())
    }

    // --- Sessions ---

    /// Persist a session, preserving `created_at` on update
    pub fn save_session(&self, session: &ChatSession) -> Result<()> {
        let conn = self.connect()?;
        let data = serde_json::to_string(session)
            .context("Failed to serialize session")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO sessions (id, data, created_at, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
            params![session.id, data, now, now],
        )
        .context("Failed to save session")
        .map_err(|e| TopikaError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Load a session by exact id or unique prefix
    ///
    /// A legacy bare-array value is upgraded in place: the structured form
    /// with zeroed counters is written back before the session is returned.
    pub fn load_session(&self, id: &str) -> Result<Option<ChatSession>> {
        let Some(resolved) = self.resolve_session_id(id)? else {
            return Ok(None);
        };

        let conn = self.connect()?;
        let data: String = conn
            .query_row(
                "SELECT data FROM sessions WHERE id = ?",
                params![resolved],
                |row| row.get(0),
            )
            .context("Failed to query session")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;

        let value: serde_json::Value = serde_json::from_str(&data)
            .context("Failed to parse session data")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;

        let (session, upgraded) = ChatSession::from_value(resolved, value)
            .context("Failed to deserialize session")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;

        if upgraded {
            tracing::info!("Upgraded legacy session layout for {}", session.id);
            self.save_session(&session)?;
        }

        Ok(Some(session))
    }

    /// Resolve an id or 8-char prefix to a stored session id
    fn resolve_session_id(&self, id: &str) -> Result<Option<String>> {
        let conn = self.connect()?;

        let exact: Option<String> = conn
            .query_row(
                "SELECT id FROM sessions WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query session id")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;
        if exact.is_some() {
            return Ok(exact);
        }

        let mut stmt = conn
            .prepare("SELECT id FROM sessions WHERE id LIKE ? LIMIT 2")
            .context("Failed to prepare statement")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;
        let matches: Vec<String> = stmt
            .query_map(params![format!("{}%", id)], |row| row.get(0))
            .context("Failed to query session prefix")
            .map_err(|e| TopikaError::Storage(e.to_string()))?
            .flatten()
            .collect();

        match matches.as_slice() {
            [only] => Ok(Some(only.clone())),
            _ => Ok(None),
        }
    }

    /// Create a new empty session, persist it, and make it active
    pub fn create_session(&self) -> Result<ChatSession> {
        let session = ChatSession::new();
        self.save_session(&session)?;
        self.set_setting(SETTING_ACTIVE_SESSION, &session.id)?;
        tracing::info!("Created session {}", session.id);
        Ok(session)
    }

    /// Load the active session, creating one when the store is empty
    ///
    /// When the recorded active id no longer resolves, an arbitrary stored
    /// session becomes active instead.
    pub fn ensure_active_session(&self) -> Result<ChatSession> {
        if let Some(active_id) = self.get_setting(SETTING_ACTIVE_SESSION)? {
            if let Some(session) = self.load_session(&active_id)? {
                return Ok(session);
            }
        }

        if let Some(summary) = self.list_sessions()?.into_iter().next() {
            self.set_setting(SETTING_ACTIVE_SESSION, &summary.id)?;
            if let Some(session) = self.load_session(&summary.id)? {
                return Ok(session);
            }
        }

        self.create_session()
    }

    /// Switch the active session
    ///
    /// Returns the session when the id resolves; `None` means the id is
    /// unknown and nothing changed (the caller treats it as a no-op).
    pub fn switch_session(&self, id: &str) -> Result<Option<ChatSession>> {
        match self.load_session(id)? {
            Some(session) => {
                self.set_setting(SETTING_ACTIVE_SESSION, &session.id)?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Delete a session
    ///
    /// Refused (returns false, nothing changes) when it is the last
    /// remaining session. When the deleted session was active, an
    /// arbitrary survivor becomes active.
    pub fn delete_session(&self, id: &str) -> Result<bool> {
        let Some(resolved) = self.resolve_session_id(id)? else {
            return Ok(false);
        };

        if self.session_count()? <= 1 {
            tracing::warn!("Refusing to delete the last remaining session");
            return Ok(false);
        }

        let conn = self.connect()?;
        conn.execute("DELETE FROM sessions WHERE id = ?", params![resolved])
            .context("Failed to delete session")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;

        if self.get_setting(SETTING_ACTIVE_SESSION)?.as_deref() == Some(resolved.as_str()) {
            if let Some(summary) = self.list_sessions()?.into_iter().next() {
                self.set_setting(SETTING_ACTIVE_SESSION, &summary.id)?;
            }
        }

        tracing::info!("Deleted session {}", resolved);
        Ok(true)
    }

    /// Append a message to a session and persist immediately
    pub fn append_message(&self, session: &mut ChatSession, message: StoredMessage) -> Result<()> {
        session.push_message(message);
        self.save_session(session)
    }

    /// Number of stored sessions
    pub fn session_count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row("SELECT count(*) FROM sessions", [], |row| row.get(0))
            .context("Failed to count sessions")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;
        Ok(count as usize)
    }

    /// List stored sessions, most recently updated first
    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, data, created_at, updated_at
                 FROM sessions
                 ORDER BY updated_at DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let data: String = row.get(1)?;
                let created_at: String = row.get(2)?;
                let updated_at: String = row.get(3)?;
                Ok((id, data, created_at, updated_at))
            })
            .context("Failed to query sessions")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;

        let mut summaries = Vec::new();
        for row in rows.flatten() {
            let (id, data, created_at, updated_at) = row;
            let value: serde_json::Value = match serde_json::from_str(&data) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Skipping unreadable session {}: {}", id, e);
                    continue;
                }
            };
            let Ok((session, _)) = ChatSession::from_value(id.clone(), value) else {
                tracing::warn!("Skipping malformed session {}", id);
                continue;
            };

            summaries.push(SessionSummary {
                id,
                created_at: parse_timestamp(&created_at),
                updated_at: parse_timestamp(&updated_at),
                message_total: session.messages.len(),
                total_input_tokens: session.total_input_tokens,
                total_output_tokens: session.total_output_tokens,
            });
        }

        Ok(summaries)
    }

    /// The currently active session id, when recorded
    pub fn active_session_id(&self) -> Result<Option<String>> {
        self.get_setting(SETTING_ACTIVE_SESSION)
    }

    // --- Settings ---

    /// Stored API key, when present
    pub fn api_key(&self) -> Result<Option<String>> {
        self.get_setting(SETTING_API_KEY)
    }

    /// Store the API key (kept cleartext, matching the ported behavior)
    pub fn set_api_key(&self, key: &str) -> Result<()> {
        self.set_setting(SETTING_API_KEY, key)
    }

    /// Remove the stored API key
    pub fn clear_api_key(&self) -> Result<()> {
        self.delete_setting(SETTING_API_KEY)
    }

    /// Selected voice id, when present
    pub fn voice(&self) -> Result<Option<String>> {
        self.get_setting(SETTING_VOICE)
    }

    /// Store the selected voice id
    pub fn set_voice(&self, voice: &str) -> Result<()> {
        self.set_setting(SETTING_VOICE, voice)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to query setting")
        .map_err(|e| TopikaError::Storage(e.to_string()).into())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to store setting")
        .map_err(|e| TopikaError::Storage(e.to_string()))?;
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<()> {
        let conn = self.connect()?;
        conn.execute("DELETE FROM settings WHERE key = ?", params![key])
            .context("Failed to delete setting")
            .map_err(|e| TopikaError::Storage(e.to_string()))?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::tempdir;

    /// Helper: create a temporary store backed by a temp directory.
    ///
    /// Returns both the store and the `TempDir` so the caller keeps
    /// ownership of the directory (preventing it from being removed).
    fn create_test_store() -> (SessionStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("store.db");
        let store = SessionStore::new_with_path(db_path).expect("failed to create store");
        (store, dir)
    }

    fn insert_raw_session(store: &SessionStore, id: &str, data: &str) {
        let conn = Connection::open(&store.db_path).expect("open connection");
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO sessions (id, data, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![id, data, now, now],
        )
        .expect("insert raw session");
    }

    #[test]
    fn test_init_creates_tables() {
        let (store, _dir) = create_test_store();
        let conn = Connection::open(&store.db_path).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name IN ('sessions','settings')",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_create_session_persists_and_activates() {
        let (store, _dir) = create_test_store();
        let session = store.create_session().expect("create failed");

        assert_eq!(store.session_count().unwrap(), 1);
        assert_eq!(store.active_session_id().unwrap(), Some(session.id.clone()));

        let loaded = store.load_session(&session.id).expect("load failed");
        assert_eq!(loaded.unwrap().id, session.id);
    }

    #[test]
    fn test_ensure_active_session_creates_on_first_use() {
        let (store, _dir) = create_test_store();
        let session = store.ensure_active_session().expect("ensure failed");
        assert_eq!(store.session_count().unwrap(), 1);
        assert_eq!(store.active_session_id().unwrap(), Some(session.id));
    }

    #[test]
    fn test_ensure_active_session_recovers_stale_active_id() {
        let (store, _dir) = create_test_store();
        let kept = store.create_session().expect("create failed");
        store
            .set_setting(SETTING_ACTIVE_SESSION, "no-such-session")
            .expect("set failed");

        let session = store.ensure_active_session().expect("ensure failed");
        assert_eq!(session.id, kept.id);
        assert_eq!(store.active_session_id().unwrap(), Some(kept.id));
    }

    #[test]
    fn test_switch_session_unknown_id_is_noop() {
        let (store, _dir) = create_test_store();
        let session = store.create_session().expect("create failed");

        let result = store.switch_session("missing").expect("switch failed");
        assert!(result.is_none());
        assert_eq!(store.active_session_id().unwrap(), Some(session.id));
    }

    #[test]
    fn test_switch_session_by_prefix() {
        let (store, _dir) = create_test_store();
        let _first = store.create_session().expect("create failed");
        let second = store.create_session().expect("create failed");

        let prefix = &second.id[..8];
        let switched = store.switch_session(prefix).expect("switch failed");
        assert_eq!(switched.unwrap().id, second.id);
        assert_eq!(store.active_session_id().unwrap(), Some(second.id));
    }

    #[test]
    fn test_delete_last_session_is_refused() {
        let (store, _dir) = create_test_store();
        let session = store.create_session().expect("create failed");

        let deleted = store.delete_session(&session.id).expect("delete failed");
        assert!(!deleted);
        assert_eq!(store.session_count().unwrap(), 1);
        assert_eq!(store.active_session_id().unwrap(), Some(session.id));
    }

    #[test]
    fn test_delete_active_session_activates_survivor() {
        let (store, _dir) = create_test_store();
        let first = store.create_session().expect("create failed");
        let second = store.create_session().expect("create failed");
        assert_eq!(store.active_session_id().unwrap(), Some(second.id.clone()));

        let deleted = store.delete_session(&second.id).expect("delete failed");
        assert!(deleted);
        assert_eq!(store.session_count().unwrap(), 1);
        assert_eq!(store.active_session_id().unwrap(), Some(first.id));
    }

    #[test]
    fn test_delete_inactive_session_keeps_active() {
        let (store, _dir) = create_test_store();
        let first = store.create_session().expect("create failed");
        let second = store.create_session().expect("create failed");

        let deleted = store.delete_session(&first.id).expect("delete failed");
        assert!(deleted);
        assert_eq!(store.active_session_id().unwrap(), Some(second.id));
    }

    #[test]
    fn test_delete_unknown_session_returns_false() {
        let (store, _dir) = create_test_store();
        store.create_session().expect("create failed");
        store.create_session().expect("create failed");
        assert!(!store.delete_session("missing").expect("delete failed"));
        assert_eq!(store.session_count().unwrap(), 2);
    }

    #[test]
    fn test_append_message_persists_synchronously() {
        let (store, _dir) = create_test_store();
        let mut session = store.create_session().expect("create failed");

        store
            .append_message(&mut session, StoredMessage::new(MessageRole::User, "hello"))
            .expect("append failed");
        store
            .append_message(
                &mut session,
                StoredMessage::with_tokens(
                    MessageRole::Assistant,
                    "hi",
                    MessageTokens { input: 10, output: 5 },
                ),
            )
            .expect("append failed");

        let reloaded = store
            .load_session(&session.id)
            .expect("load failed")
            .expect("session missing");
        assert_eq!(reloaded.messages.len(), 2);
        assert_eq!(reloaded.message_count, 1);
        assert_eq!(reloaded.total_input_tokens, 10);
        assert_eq!(reloaded.total_output_tokens, 5);
    }

    #[test]
    fn test_legacy_array_layout_upgraded_on_load() {
        let (store, _dir) = create_test_store();
        // Legacy layout: the session value is a bare message array.
        insert_raw_session(
            &store,
            "legacy-1",
            r#"[{"role":"user","content":"old question"},{"role":"assistant","content":"old answer"}]"#,
        );

        let session = store
            .load_session("legacy-1")
            .expect("load failed")
            .expect("session missing");
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "old question");
        assert_eq!(session.message_count, 0);
        assert_eq!(session.total_input_tokens, 0);
        assert_eq!(session.total_output_tokens, 0);

        // The upgrade is persisted: the raw value is structured now.
        let conn = Connection::open(&store.db_path).expect("open connection");
        let raw: String = conn
            .query_row(
                "SELECT data FROM sessions WHERE id = 'legacy-1'",
                [],
                |row| row.get(0),
            )
            .expect("query row");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        assert!(value.is_object());
        assert_eq!(value["message_count"], 0);
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_list_sessions_orders_by_updated_at() {
        let (store, _dir) = create_test_store();
        let first = store.create_session().expect("create failed");
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = store.create_session().expect("create failed");

        let sessions = store.list_sessions().expect("list failed");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second.id);
        assert_eq!(sessions[1].id, first.id);
    }

    #[test]
    fn test_list_sessions_empty_store() {
        let (store, _dir) = create_test_store();
        assert!(store.list_sessions().expect("list failed").is_empty());
    }

    #[test]
    fn test_audio_dir_created_next_to_db() {
        let (store, dir) = create_test_store();
        let audio = store.audio_dir().expect("audio dir failed");
        assert!(audio.exists());
        assert_eq!(audio, dir.path().join("audio"));
    }

    #[test]
    fn test_api_key_roundtrip_and_clear() {
        let (store, _dir) = create_test_store();
        assert!(store.api_key().unwrap().is_none());

        store.set_api_key("sk-test").expect("set failed");
        assert_eq!(store.api_key().unwrap().as_deref(), Some("sk-test"));

        store.clear_api_key().expect("clear failed");
        assert!(store.api_key().unwrap().is_none());
    }

    #[test]
    fn test_voice_setting_roundtrip() {
        let (store, _dir) = create_test_store();
        assert!(store.voice().unwrap().is_none());
        store.set_voice("nova").expect("set failed");
        assert_eq!(store.voice().unwrap().as_deref(), Some("nova"));
    }

    #[test]
    #[serial]
    fn test_new_respects_env_override() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let db_path = dir.path().join("nested").join("store.db");
        env::set_var("TOPIKA_STORE_DB", db_path.to_string_lossy().to_string());

        let store = SessionStore::new().expect("new failed with env override");
        assert_eq!(store.db_path, db_path);
        assert!(db_path.parent().unwrap().exists());

        env::remove_var("TOPIKA_STORE_DB");
    }
}
