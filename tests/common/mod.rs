//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Fixed "now" used by fixtures: 2026-03-15T12:00:00Z
pub const NOW_MS: i64 = 1_773_576_000_000;
pub const DAY_MS: i64 = 86_400_000;

/// Builder for a temporary Cursor `state.vscdb`
pub struct StoreBuilder {
    temp_dir: TempDir,
    path: PathBuf,
    conn: Connection,
}

impl StoreBuilder {
    /// Create a store with the `cursorDiskKV` table and no rows
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("state.vscdb");
        let conn = Connection::open(&path).expect("Failed to create store");
        conn.execute_batch(
            "CREATE TABLE cursorDiskKV (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);
             CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);",
        )
        .expect("Failed to create tables");
        Self { temp_dir, path, conn }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a raw row; `None` stores SQL NULL
    pub fn with_raw(self, key: &str, value: Option<&str>) -> Self {
        self.conn
            .execute("INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)", params![key, value])
            .expect("Failed to insert row");
        self
    }

    pub fn with_conversation(self, conversation: ConversationBuilder) -> Self {
        let key = format!("composerData:{}", conversation.id);
        let json = conversation.to_json();
        self.with_raw(&key, Some(&json))
    }

    pub fn with_message(self, conversation_id: &str, message: MessageBuilder) -> Self {
        let key = format!("bubbleId:{}:{}", conversation_id, message.id);
        let json = message.to_json();
        self.with_raw(&key, Some(&json))
    }

    /// Add a conversation and its messages in one call
    pub fn with_thread(self, conversation: ConversationBuilder, messages: Vec<MessageBuilder>) -> Self {
        let id = conversation.id.clone();
        let mut builder = self.with_conversation(conversation);
        for message in messages {
            builder = builder.with_message(&id, message);
        }
        builder
    }

    pub fn with_code_diff(self, conversation_id: &str, diff_id: &str, value: Value) -> Self {
        let key = format!("codeBlockDiff:{}:{}", conversation_id, diff_id);
        self.with_raw(&key, Some(&value.to_string()))
    }

    /// Add an unrelated row to the secondary table Cursor also keeps
    pub fn with_item_table_row(self, key: &str, value: &str) -> Self {
        self.conn
            .execute("INSERT INTO ItemTable (key, value) VALUES (?1, ?2)", params![key, value])
            .expect("Failed to insert row");
        self
    }

    /// Keep the temp dir alive; the store lives at `<dir>/state.vscdb`
    pub fn build(self) -> BuiltStore {
        BuiltStore { _temp_dir: self.temp_dir, path: self.path }
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BuiltStore {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl BuiltStore {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Builder for `composerData:<id>` payloads
pub struct ConversationBuilder {
    id: String,
    fields: serde_json::Map<String, Value>,
}

impl ConversationBuilder {
    pub fn new(id: &str) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("composerId".to_string(), json!(id));
        fields.insert("createdAt".to_string(), json!(NOW_MS - DAY_MS));
        Self { id: id.to_string(), fields }
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub fn name(self, name: &str) -> Self {
        self.set("name", json!(name))
    }

    pub fn subtitle(self, subtitle: &str) -> Self {
        self.set("subtitle", json!(subtitle))
    }

    pub fn created_at(self, ms: i64) -> Self {
        self.set("createdAt", json!(ms))
    }

    pub fn days_ago(self, days: i64) -> Self {
        self.created_at(NOW_MS - days * DAY_MS)
    }

    /// Remove the creation timestamp entirely
    pub fn without_timestamp(mut self) -> Self {
        self.fields.remove("createdAt");
        self
    }

    pub fn archived(self) -> Self {
        self.set("isArchived", json!(true))
    }

    pub fn status(self, status: &str) -> Self {
        self.set("status", json!(status))
    }

    pub fn lines(self, added: i64, removed: i64) -> Self {
        self.set("totalLinesAdded", json!(added)).set("totalLinesRemoved", json!(removed))
    }

    pub fn draft(self, text: &str) -> Self {
        self.set("text", json!(text))
    }

    pub fn code_block(self, file_uri: &str, bubble_id: &str) -> Self {
        self.set("codeBlockData", json!({ file_uri: { "block-1": { "bubbleId": bubble_id } } }))
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

/// Builder for `bubbleId:<conversationId>:<id>` payloads
pub struct MessageBuilder {
    id: String,
    fields: serde_json::Map<String, Value>,
}

impl MessageBuilder {
    fn new(id: &str, type_code: i64, text: &str) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("bubbleId".to_string(), json!(id));
        fields.insert("type".to_string(), json!(type_code));
        fields.insert("text".to_string(), json!(text));
        Self { id: id.to_string(), fields }
    }

    pub fn user(id: &str, text: &str) -> Self {
        Self::new(id, 1, text)
    }

    pub fn assistant(id: &str, text: &str) -> Self {
        Self::new(id, 2, text)
    }

    /// Message with an arbitrary, possibly invalid, type code
    pub fn with_type(id: &str, type_code: i64, text: &str) -> Self {
        Self::new(id, type_code, text)
    }

    pub fn created_at(mut self, ms: i64) -> Self {
        self.fields.insert("createdAt".to_string(), json!(ms));
        self
    }

    /// Timestamp in the ISO-8601 form newer Cursor versions write
    pub fn created_at_iso(mut self, iso: &str) -> Self {
        self.fields.insert("createdAt".to_string(), json!(iso));
        self
    }

    pub fn diff(mut self, diff: &str) -> Self {
        self.fields.insert("diffText".to_string(), json!(diff));
        self
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

/// A small store resembling real usage: named, unnamed, archived and undated conversations
pub fn realistic_store() -> BuiltStore {
    StoreBuilder::new()
        .with_thread(
            ConversationBuilder::new("c0a1f9e2-login").name("Fix login bug").subtitle("auth.rs").days_ago(1).lines(12, 3),
            vec![
                MessageBuilder::user("m1", "The login form rejects valid passwords").created_at(NOW_MS - DAY_MS + 1_000),
                MessageBuilder::assistant("m2", "The bcrypt cost factor mismatch causes it")
                    .created_at(NOW_MS - DAY_MS + 2_000)
                    .diff("- cost: 10\n+ cost: 12"),
            ],
        )
        .with_thread(
            ConversationBuilder::new("d4b7c3a0-migrate").days_ago(3),
            vec![
                MessageBuilder::user("m1", "Write a database migration for postgres\nwith rollback")
                    .created_at_iso("2026-03-12T12:00:05Z"),
                MessageBuilder::assistant("m2", "Here is the migration").created_at_iso("2026-03-12T12:00:09Z"),
            ],
        )
        .with_thread(
            ConversationBuilder::new("e9f0d1c2-old").name("Old experiment").days_ago(40).archived(),
            vec![MessageBuilder::user("m1", "archived postgres question").created_at(NOW_MS - 40 * DAY_MS)],
        )
        .with_thread(
            ConversationBuilder::new("f1e2d3c4-undated").name("Undated notes").without_timestamp(),
            vec![MessageBuilder::user("m1", "notes about postgres")],
        )
        .with_item_table_row("workbench.panel", "{}")
        .build()
}
