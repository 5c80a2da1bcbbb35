//! Integration tests for session persistence across store instances
//!
//! Verifies that every mutation is durable: a second store opened on the
//! same database sees appended messages, counters, the active session id,
//! and the upgraded form of legacy sessions.

use topika::storage::{MessageRole, MessageTokens, SessionStore, StoredMessage};

fn store_pair(dir: &tempfile::TempDir) -> (SessionStore, std::path::PathBuf) {
    let db_path = dir.path().join("store.db");
    let store = SessionStore::new_with_path(&db_path).expect("create store");
    (store, db_path)
}

#[test]
fn messages_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (store, db_path) = store_pair(&dir);

    let mut session = store.create_session().unwrap();
    store
        .append_message(&mut session, StoredMessage::new(MessageRole::User, "ping"))
        .unwrap();
    store
        .append_message(
            &mut session,
            StoredMessage::with_tokens(
                MessageRole::Assistant,
                "pong",
                MessageTokens { input: 8, output: 2 },
            ),
        )
        .unwrap();
    drop(store);

    let reopened = SessionStore::new_with_path(&db_path).unwrap();
    let loaded = reopened
        .load_session(&session.id)
        .unwrap()
        .expect("session survives reopen");
    assert_eq!(loaded.messages.len(), 2);
    assert_eq!(loaded.messages[1].content, "pong");
    assert_eq!(loaded.total_input_tokens, 8);
    assert_eq!(loaded.total_output_tokens, 2);
    assert_eq!(loaded.message_count, 1);
}

#[test]
fn active_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (store, db_path) = store_pair(&dir);

    let _first = store.create_session().unwrap();
    let second = store.create_session().unwrap();
    drop(store);

    let reopened = SessionStore::new_with_path(&db_path).unwrap();
    assert_eq!(reopened.active_session_id().unwrap(), Some(second.id.clone()));
    let active = reopened.ensure_active_session().unwrap();
    assert_eq!(active.id, second.id);
}

#[test]
fn settings_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (store, db_path) = store_pair(&dir);

    store.set_api_key("sk-durable").unwrap();
    store.set_voice("atlas").unwrap();
    drop(store);

    let reopened = SessionStore::new_with_path(&db_path).unwrap();
    assert_eq!(reopened.api_key().unwrap().as_deref(), Some("sk-durable"));
    assert_eq!(reopened.voice().unwrap().as_deref(), Some("atlas"));
}

#[test]
fn legacy_upgrade_is_durable() {
    let dir = tempfile::tempdir().unwrap();
    let (store, db_path) = store_pair(&dir);

    // Seed a legacy bare-array session value directly.
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "INSERT INTO sessions (id, data, created_at, updated_at) VALUES (?, ?, ?, ?)",
        rusqlite::params![
            "legacy-session",
            r#"[{"role":"user","content":"old"},{"role":"assistant","content":"answer"}]"#,
            chrono::Utc::now().to_rfc3339(),
            chrono::Utc::now().to_rfc3339()
        ],
    )
    .unwrap();
    drop(conn);

    // First load performs the upgrade.
    let upgraded = store
        .load_session("legacy-session")
        .unwrap()
        .expect("legacy session loads");
    assert_eq!(upgraded.messages.len(), 2);
    assert_eq!(upgraded.message_count, 0);
    assert_eq!(upgraded.total_input_tokens, 0);
    drop(store);

    // A fresh store sees the structured layout with messages intact.
    let reopened = SessionStore::new_with_path(&db_path).unwrap();
    let loaded = reopened
        .load_session("legacy-session")
        .unwrap()
        .expect("upgraded session loads");
    assert_eq!(loaded.messages[0].content, "old");
    assert_eq!(loaded.messages[1].content, "answer");
    assert_eq!(loaded.message_count, 0);
}

#[test]
fn delete_guard_holds_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let (store, db_path) = store_pair(&dir);

    let only = store.create_session().unwrap();
    drop(store);

    let reopened = SessionStore::new_with_path(&db_path).unwrap();
    assert!(!reopened.delete_session(&only.id).unwrap());
    assert_eq!(reopened.session_count().unwrap(), 1);
    assert_eq!(reopened.active_session_id().unwrap(), Some(only.id));
}
