//! Catalog builder for the Cursor conversation store.
//!
//! # Error Handling Strategy
//!
//! - **Store-level errors** (missing, locked, corrupt store) are returned as [`Error`]
//!   and abort the build.
//! - **Record-level errors** never abort: the record is skipped and counted in the
//!   catalog's [`DecodeReport`], with a warning logged through `tracing`.
//! - **Duplicate identifiers**: the first conversation record wins; later ones are
//!   counted as skipped.
//!
//! [`Error`]: crate::error::Error

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::Conversation;
use crate::parsers::{
    DecodeReport, MappedConversation, MessageDigest, RecordDecodeError, decode_conversation, decode_message,
    finalize_conversation,
};
use crate::store::{CONVERSATION_PREFIX, MESSAGE_PREFIX, RecordKey, Store};

/// All conversations in a store, most recent first, plus decode diagnostics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub conversations: Vec<Conversation>,
    pub report: DecodeReport,
}

impl Catalog {
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

/// Build the conversation catalog from one pass over conversation records and one
/// pass over message records
///
/// Message bodies are not retained; the message pass only derives counts and
/// fallback titles. Use [`Conversation::messages`] to load them.
///
/// # Errors
///
/// Returns an error only for store-level failures. Malformed records are skipped
/// and counted in [`Catalog::report`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use cursor_history_explorer::{Store, build_catalog};
///
/// let store = Store::open(Path::new("state.vscdb"))?;
/// let catalog = build_catalog(&store)?;
/// println!("Loaded {} conversations", catalog.len());
/// # Ok::<(), cursor_history_explorer::Error>(())
/// ```
pub fn build_catalog(store: &Store) -> Result<Catalog> {
    let mut report = DecodeReport::default();
    let mut mapped: Vec<MappedConversation> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();

    store.scan_prefix(CONVERSATION_PREFIX, |key, payload| {
        let RecordKey::Conversation { conversation_id: key_id } = RecordKey::parse(key) else {
            return;
        };
        match decode_conversation(key, key_id, payload) {
            Ok(conversation) => {
                let id = conversation.conversation.id.clone();
                if index_by_id.contains_key(&id) {
                    report.record_conversation_failure(RecordDecodeError {
                        key: key.to_string(),
                        reason: format!("duplicate conversation identifier '{}'", id),
                    });
                    return;
                }
                let index = mapped.len();
                index_by_id.insert(id, index);
                mapped.push(conversation);
                report.conversations_decoded += 1;
            }
            Err(e) => report.record_conversation_failure(e),
        }
    })?;

    let mut digests: Vec<MessageDigest> = vec![MessageDigest::default(); mapped.len()];

    store.scan_prefix(MESSAGE_PREFIX, |key, payload| {
        let RecordKey::Message { conversation_id, message_id } = RecordKey::parse(key) else {
            return;
        };
        let Some(&index) = index_by_id.get(conversation_id) else {
            report.orphan_messages += 1;
            return;
        };
        match decode_message(key, conversation_id, message_id, payload) {
            Ok(message) => {
                let referenced = mapped[index].code_block_bubbles.contains(&message.id);
                digests[index].observe(&message, referenced);
                report.messages_decoded += 1;
            }
            Err(e) => report.record_message_failure(e),
        }
    })?;

    let mut conversations: Vec<Conversation> = mapped
        .into_iter()
        .zip(digests.iter())
        .map(|(conversation, digest)| finalize_conversation(conversation, Some(digest)))
        .collect();

    // Newest first, unknown timestamps last
    conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    if report.orphan_messages > 0 {
        debug!(orphans = report.orphan_messages, "Messages without a conversation record");
    }
    info!(
        conversations = conversations.len(),
        messages = report.messages_decoded,
        skipped = report.skipped(),
        "Built conversation catalog"
    );

    Ok(Catalog { conversations, report })
}
