//! Error taxonomy for store access and user input.
//!
//! Store-level and grammar-level failures abort the current command. Failures to
//! decode a single record are not represented here: they are counted in a
//! [`DecodeReport`](crate::parsers::mapper::DecodeReport) and processing continues.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The store file is missing, unreadable, or not an SQLite database.
    #[error("conversation store unavailable at {}: {reason}", path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// Another process holds a lock on the store. Not retried.
    #[error(
        "conversation store at {} is locked by another process (close Cursor and try again)",
        path.display()
    )]
    StoreLocked { path: PathBuf },

    /// The file opened as a database but does not look like a conversation store.
    #[error("conversation store at {} is corrupt: {reason}", path.display())]
    StoreCorrupt { path: PathBuf, reason: String },

    /// A query against an already opened store failed.
    #[error("failed to read conversation store at {}: {source}", path.display())]
    Query {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error(
        "invalid time expression: '{0}' (expected e.g. 3d, 4h, 15m, 2w, 2024-01-31, 2024-01-31 14:30 or 01/31/2024)"
    )]
    InvalidTimeExpression(String),

    #[error("invalid time range: since ({since}) must be earlier than before ({before})")]
    InvalidTimeRange { since: DateTime<Utc>, before: DateTime<Utc> },

    #[error("invalid search query: {0}")]
    InvalidQuery(String),
}

impl Error {
    /// Whether the failure clears up without any change on the user's side
    /// other than closing the application holding the store.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreLocked { .. })
    }
}
