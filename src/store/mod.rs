//! Read-only access to Cursor's `state.vscdb` key-value store
//!
//! The store is an SQLite file with a single `cursorDiskKV(key, value)` table. Keys
//! carry the record kind and identifiers:
//!
//! - `composerData:<conversationId>` - conversation metadata
//! - `bubbleId:<conversationId>:<messageId>` - one message
//! - `codeBlockDiff:<conversationId>:<diffId>` - one code diff
//!
//! Every other key is ignored.

pub mod reader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use reader::{Store, StoreInfo};

use crate::error::Result;
use crate::models::{CodeDiff, MessageBatch};

pub const KV_TABLE: &str = "cursorDiskKV";
pub const CONVERSATION_PREFIX: &str = "composerData:";
pub const MESSAGE_PREFIX: &str = "bubbleId:";
pub const CODE_DIFF_PREFIX: &str = "codeBlockDiff:";

/// Parsed form of a store key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKey<'a> {
    Conversation { conversation_id: &'a str },
    Message { conversation_id: &'a str, message_id: &'a str },
    CodeDiff { conversation_id: &'a str, diff_id: &'a str },
    Unrecognized,
}

impl<'a> RecordKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        if let Some(id) = key.strip_prefix(CONVERSATION_PREFIX) {
            return Self::Conversation { conversation_id: id };
        }
        if let Some((conversation_id, message_id)) =
            key.strip_prefix(MESSAGE_PREFIX).and_then(|rest| rest.split_once(':'))
        {
            return Self::Message { conversation_id, message_id };
        }
        if let Some((conversation_id, diff_id)) =
            key.strip_prefix(CODE_DIFF_PREFIX).and_then(|rest| rest.split_once(':'))
        {
            return Self::CodeDiff { conversation_id, diff_id };
        }
        Self::Unrecognized
    }
}

/// Per-conversation content that is fetched on demand rather than with the catalog
pub trait ConversationSource {
    /// Messages of one conversation, ordered by creation time
    fn load_messages(&self, conversation_id: &str) -> Result<MessageBatch>;

    fn load_code_diffs(&self, conversation_id: &str) -> Result<Vec<CodeDiff>>;
}
