use std::path::{Path, PathBuf};

use rusqlite::{Connection, params};
use tempfile::TempDir;

use super::Store;
use crate::error::Result;

/// Temporary on-disk store with Cursor's table layout, for unit tests
pub(crate) struct FixtureStore {
    _dir: TempDir,
    path: PathBuf,
    conn: Connection,
}

impl FixtureStore {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("state.vscdb");
        let conn = Connection::open(&path).expect("Failed to create fixture store");
        conn.execute_batch("CREATE TABLE cursorDiskKV (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);")
            .expect("Failed to create table");
        Self { _dir: dir, path, conn }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn raw(self, key: &str, value: Option<&str>) -> Self {
        self.conn
            .execute("INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)", params![key, value])
            .expect("Failed to insert row");
        self
    }

    pub(crate) fn blob(self, key: &str, value: &[u8]) -> Self {
        self.conn
            .execute("INSERT INTO cursorDiskKV (key, value) VALUES (?1, ?2)", params![key, value])
            .expect("Failed to insert row");
        self
    }

    pub(crate) fn conversation(self, id: &str, json: &str) -> Self {
        self.raw(&format!("composerData:{}", id), Some(json))
    }

    pub(crate) fn message(self, conversation_id: &str, message_id: &str, json: &str) -> Self {
        self.raw(&format!("bubbleId:{}:{}", conversation_id, message_id), Some(json))
    }

    pub(crate) fn open(&self) -> Result<Store> {
        Store::open(&self.path)
    }
}
