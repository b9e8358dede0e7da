//! Mapping of raw store payloads onto [`Conversation`], [`Message`] and [`CodeDiff`].
//!
//! Each function handles exactly one record. A record that cannot be decoded yields a
//! [`RecordDecodeError`]; callers count it in a [`DecodeReport`] and move on.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    CodeDiff, Conversation, ConversationStatus, Message, RawBubble, RawComposer, Role, TitleSource,
};
use crate::utils::text::{first_line, truncate_text};

const PREVIEW_CHARS: usize = 100;
const FALLBACK_TITLE_CHARS: usize = 60;
const MAX_ERROR_SAMPLES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("failed to decode record '{key}': {reason}")]
pub struct RecordDecodeError {
    pub key: String,
    pub reason: String,
}

impl RecordDecodeError {
    fn new(key: &str, reason: impl Into<String>) -> Self {
        Self { key: key.to_string(), reason: reason.into() }
    }
}

/// Tally of records decoded and skipped while loading a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    pub conversations_decoded: usize,
    pub conversations_skipped: usize,
    pub messages_decoded: usize,
    pub messages_skipped: usize,
    /// Messages whose conversation has no metadata record
    pub orphan_messages: usize,
    /// First few decode failures, for diagnostics
    pub samples: Vec<RecordDecodeError>,
}

impl DecodeReport {
    pub fn record_conversation_failure(&mut self, error: RecordDecodeError) {
        self.conversations_skipped += 1;
        self.push_sample(error);
    }

    pub fn record_message_failure(&mut self, error: RecordDecodeError) {
        self.messages_skipped += 1;
        self.push_sample(error);
    }

    pub fn skipped(&self) -> usize {
        self.conversations_skipped + self.messages_skipped
    }

    fn push_sample(&mut self, error: RecordDecodeError) {
        warn!("Skipping record: {}", error);
        if self.samples.len() < MAX_ERROR_SAMPLES {
            self.samples.push(error);
        }
    }
}

/// A decoded conversation before message-derived fields are filled in
#[derive(Debug, Clone)]
pub struct MappedConversation {
    pub conversation: Conversation,
    /// Message ids referenced from `codeBlockData`
    pub code_block_bubbles: HashSet<String>,
}

/// Decode a `composerData:<id>` payload
///
/// The id always comes from the key, since message and diff keys are built from it.
/// A differing `composerId` inside the payload is only logged.
pub fn decode_conversation(key: &str, key_id: &str, payload: &[u8]) -> Result<MappedConversation, RecordDecodeError> {
    let raw: RawComposer =
        serde_json::from_slice(payload).map_err(|e| RecordDecodeError::new(key, e.to_string()))?;

    if key_id.trim().is_empty() {
        return Err(RecordDecodeError::new(key, "missing conversation identifier"));
    }
    let id = key_id.to_string();
    if let Some(payload_id) = raw.composer_id.as_deref().filter(|p| !p.trim().is_empty() && *p != key_id) {
        debug!(key_id, payload_id, "composerId differs from record key, using key");
    }

    let (title, title_source) = match raw.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => (name.to_string(), TitleSource::Name),
        _ => (id.clone(), TitleSource::Identifier),
    };

    let (code_block_files, code_block_bubbles) = raw
        .code_block_data
        .as_ref()
        .map(read_code_block_data)
        .unwrap_or_default();

    let conversation = Conversation {
        title,
        title_source,
        subtitle: raw.subtitle.filter(|s| !s.trim().is_empty()),
        preview: raw
            .text
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.chars().take(PREVIEW_CHARS).collect()),
        created_at: raw.created_at,
        status: ConversationStatus::from_raw(raw.status.as_deref()),
        is_archived: raw.is_archived.unwrap_or(false),
        total_lines_added: raw.total_lines_added.unwrap_or(0),
        total_lines_removed: raw.total_lines_removed.unwrap_or(0),
        model: raw.model_config.and_then(|m| m.model_name),
        message_count: 0,
        code_block_files,
        id,
    };

    Ok(MappedConversation { conversation, code_block_bubbles })
}

/// Collect file URIs and referenced bubble ids from `codeBlockData`
fn read_code_block_data(data: &Value) -> (Vec<String>, HashSet<String>) {
    let mut files = Vec::new();
    let mut bubbles = HashSet::new();

    if let Value::Object(by_file) = data {
        for (file_uri, blocks) in by_file {
            files.push(file_uri.clone());
            if let Value::Object(blocks) = blocks {
                for block in blocks.values() {
                    if let Some(bubble_id) = block.get("bubbleId").and_then(Value::as_str) {
                        bubbles.insert(bubble_id.to_string());
                    }
                }
            }
        }
    }

    (files, bubbles)
}

/// Decode a `bubbleId:<conversationId>:<messageId>` payload
pub fn decode_message(
    key: &str,
    conversation_id: &str,
    key_message_id: &str,
    payload: &[u8],
) -> Result<Message, RecordDecodeError> {
    let raw: RawBubble =
        serde_json::from_slice(payload).map_err(|e| RecordDecodeError::new(key, e.to_string()))?;

    let type_code =
        raw.type_code.ok_or_else(|| RecordDecodeError::new(key, "missing message type"))?;
    let role = Role::from_type_code(type_code)
        .ok_or_else(|| RecordDecodeError::new(key, format!("unknown message type {}", type_code)))?;

    let id = raw
        .bubble_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| key_message_id.to_string());
    if id.is_empty() {
        return Err(RecordDecodeError::new(key, "missing message identifier"));
    }

    Ok(Message {
        id,
        conversation_id: conversation_id.to_string(),
        role,
        text: raw.text.unwrap_or_default(),
        created_at: raw.created_at,
        diff_text: raw.diff_text.filter(|d| !d.is_empty()),
        rich_text: raw.rich_text.and_then(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }),
        model: raw.model_info.and_then(|m| m.model_name),
        thinking: raw.thinking.and_then(|t| t.text).filter(|t| !t.is_empty()),
    })
}

/// Decode a `codeBlockDiff:<conversationId>:<diffId>` payload into its text content
pub fn decode_code_diff(
    key: &str,
    conversation_id: &str,
    diff_id: &str,
    payload: &[u8],
) -> Result<CodeDiff, RecordDecodeError> {
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| RecordDecodeError::new(key, e.to_string()))?;

    let mut parts = Vec::new();
    collect_strings(&value, &mut parts);

    Ok(CodeDiff { id: diff_id.to_string(), conversation_id: conversation_id.to_string(), content: parts.join("\n") })
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) if !s.is_empty() => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

/// Sort messages by creation time, keeping store order for equal timestamps
///
/// Messages without a timestamp sort before all timestamped ones.
pub fn order_messages(messages: &mut [Message]) {
    messages.sort_by_key(|m| m.created_at);
}

/// Per-conversation facts gathered from one pass over all message records
#[derive(Debug, Clone, Default)]
pub struct MessageDigest {
    pub non_empty: usize,
    first_user: Option<(Option<DateTime<Utc>>, String)>,
}

impl MessageDigest {
    /// Fold one message into the digest
    ///
    /// `referenced_by_code_block` marks messages that count even without text.
    pub fn observe(&mut self, message: &Message, referenced_by_code_block: bool) {
        let has_text = !message.text.trim().is_empty();
        if has_text || referenced_by_code_block {
            self.non_empty += 1;
        }

        if message.role == Role::User && has_text {
            let earlier = match &self.first_user {
                None => true,
                Some((ts, _)) => message.created_at < *ts,
            };
            if earlier {
                self.first_user = Some((message.created_at, message.text.clone()));
            }
        }
    }

    pub fn first_user_text(&self) -> Option<&str> {
        self.first_user.as_ref().map(|(_, text)| text.as_str())
    }
}

/// Fill in message-derived fields: count, and title when the record had no name
pub fn finalize_conversation(mut mapped: MappedConversation, digest: Option<&MessageDigest>) -> Conversation {
    let conversation = &mut mapped.conversation;
    if let Some(digest) = digest {
        conversation.message_count = digest.non_empty;
        if conversation.title_source == TitleSource::Identifier
            && let Some(text) = digest.first_user_text()
        {
            let line = first_line(text);
            if !line.is_empty() {
                conversation.title = truncate_text(line, FALLBACK_TITLE_CHARS);
                conversation.title_source = TitleSource::FirstUserMessage;
            }
        }
    }
    mapped.conversation
}
