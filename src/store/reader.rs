use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, ErrorCode, OpenFlags, params};
use serde::Serialize;
use tracing::debug;

use super::{CODE_DIFF_PREFIX, ConversationSource, KV_TABLE, MESSAGE_PREFIX, RecordKey};
use crate::error::{Error, Result};
use crate::models::{CodeDiff, MessageBatch};
use crate::parsers::{decode_code_diff, decode_message, order_messages};

/// Read-only handle on a Cursor store
///
/// The connection is released when the handle is dropped, on every exit path.
pub struct Store {
    conn: Connection,
    path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl Store {
    /// Open the store read-only and check that it holds conversation records
    ///
    /// # Errors
    ///
    /// - [`Error::StoreUnavailable`] if the file is missing, unreadable, or not SQLite
    /// - [`Error::StoreLocked`] if another process holds a conflicting lock
    /// - [`Error::StoreCorrupt`] if the key-value table or any conversation key is missing
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::StoreUnavailable {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }
        if !path.is_file() {
            return Err(Error::StoreUnavailable {
                path: path.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| classify_error(path, e, true))?;
        // Lock contention is reported to the user rather than waited out
        conn.busy_timeout(Duration::ZERO).map_err(|e| classify_error(path, e, true))?;

        let store = Self { conn, path: path.to_path_buf() };
        store.verify_layout()?;
        debug!("Opened conversation store at {}", path.display());
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> Result<StoreInfo> {
        let metadata = fs::metadata(&self.path).map_err(|e| Error::StoreUnavailable {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(StoreInfo { path: self.path.clone(), size_bytes: metadata.len() })
    }

    fn verify_layout(&self) -> Result<()> {
        let has_table: bool = self
            .conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
                [KV_TABLE],
                |row| row.get(0),
            )
            .map_err(|e| self.classify(e))?;
        if !has_table {
            return Err(Error::StoreCorrupt {
                path: self.path.clone(),
                reason: format!("table '{}' not found", KV_TABLE),
            });
        }

        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {KV_TABLE} WHERE (key >= ?1 AND key < ?2) OR (key >= ?3 AND key < ?4))"
        );
        let has_records: bool = self
            .conn
            .query_row(
                &sql,
                params![
                    super::CONVERSATION_PREFIX,
                    prefix_upper_bound(super::CONVERSATION_PREFIX),
                    MESSAGE_PREFIX,
                    prefix_upper_bound(MESSAGE_PREFIX)
                ],
                |row| row.get(0),
            )
            .map_err(|e| self.classify(e))?;
        if !has_records {
            return Err(Error::StoreCorrupt {
                path: self.path.clone(),
                reason: "no conversation or message records found".to_string(),
            });
        }

        Ok(())
    }

    /// Visit every record whose key starts with `prefix`, one row at a time
    ///
    /// Rows with a NULL value are skipped. Returns the number of rows visited.
    pub fn scan_prefix<F>(&self, prefix: &str, mut visit: F) -> Result<usize>
    where
        F: FnMut(&str, &[u8]),
    {
        let sql = format!("SELECT key, value FROM {KV_TABLE} WHERE key >= ?1 AND key < ?2");
        let mut stmt = self.conn.prepare_cached(&sql).map_err(|e| self.classify(e))?;
        let upper = prefix_upper_bound(prefix);
        let mut rows = stmt.query(params![prefix, upper]).map_err(|e| self.classify(e))?;

        let mut visited = 0;
        while let Some(row) = rows.next().map_err(|e| self.classify(e))? {
            let key = match row.get_ref(0).map_err(|e| self.classify(e))? {
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                _ => continue,
            };

            let scalar;
            let payload: &[u8] = match row.get_ref(1).map_err(|e| self.classify(e))? {
                ValueRef::Null => continue,
                ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes,
                ValueRef::Integer(i) => {
                    scalar = i.to_string();
                    scalar.as_bytes()
                }
                ValueRef::Real(f) => {
                    scalar = f.to_string();
                    scalar.as_bytes()
                }
            };

            visit(&key, payload);
            visited += 1;
        }

        Ok(visited)
    }

    fn classify(&self, err: rusqlite::Error) -> Error {
        classify_error(&self.path, err, false)
    }
}

impl ConversationSource for Store {
    fn load_messages(&self, conversation_id: &str) -> Result<MessageBatch> {
        let prefix = format!("{MESSAGE_PREFIX}{conversation_id}:");
        let mut batch = MessageBatch::default();

        self.scan_prefix(&prefix, |key, payload| {
            let RecordKey::Message { conversation_id, message_id } = RecordKey::parse(key) else {
                return;
            };
            match decode_message(key, conversation_id, message_id, payload) {
                Ok(message) => batch.messages.push(message),
                Err(e) => {
                    tracing::warn!("Skipping record: {}", e);
                    batch.skipped += 1;
                }
            }
        })?;

        order_messages(&mut batch.messages);
        Ok(batch)
    }

    fn load_code_diffs(&self, conversation_id: &str) -> Result<Vec<CodeDiff>> {
        let prefix = format!("{CODE_DIFF_PREFIX}{conversation_id}:");
        let mut diffs = Vec::new();

        self.scan_prefix(&prefix, |key, payload| {
            let RecordKey::CodeDiff { conversation_id, diff_id } = RecordKey::parse(key) else {
                return;
            };
            match decode_code_diff(key, conversation_id, diff_id, payload) {
                Ok(diff) => diffs.push(diff),
                Err(e) => tracing::warn!("Skipping record: {}", e),
            }
        })?;

        Ok(diffs)
    }
}

/// Smallest string greater than every string starting with `prefix`
fn prefix_upper_bound(prefix: &str) -> String {
    let mut bound = prefix.to_string();
    if let Some(last) = bound.pop() {
        match char::from_u32(last as u32 + 1) {
            Some(next) => bound.push(next),
            None => {
                bound.push(last);
                bound.push(char::MAX);
            }
        }
    }
    bound
}

fn classify_error(path: &Path, err: rusqlite::Error, opening: bool) -> Error {
    let path = path.to_path_buf();
    match err.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => Error::StoreLocked { path },
        Some(ErrorCode::NotADatabase) => {
            Error::StoreUnavailable { path, reason: "file is not an SQLite database".to_string() }
        }
        Some(ErrorCode::DatabaseCorrupt) => Error::StoreCorrupt { path, reason: err.to_string() },
        Some(ErrorCode::CannotOpen | ErrorCode::PermissionDenied) => {
            Error::StoreUnavailable { path, reason: err.to_string() }
        }
        _ if opening => Error::StoreUnavailable { path, reason: err.to_string() },
        _ => Error::Query { path, source: err },
    }
}
