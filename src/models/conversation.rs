use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::store::ConversationSource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Completed,
    Aborted,
    None,
    Other(String),
}

impl ConversationStatus {
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("none") => Self::None,
            Some("completed") => Self::Completed,
            Some("aborted") => Self::Aborted,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Aborted => "aborted",
            Self::None => "none",
            Self::Other(s) => s,
        }
    }
}

/// Where a conversation's display title came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleSource {
    Name,
    FirstUserMessage,
    Identifier,
}

/// One agent chat session (a Cursor "composer")
///
/// Messages are not held here; fetch them with [`Conversation::messages`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub title_source: TitleSource,
    pub subtitle: Option<String>,
    pub preview: Option<String>,
    /// `None` when the record carried no parseable creation time
    pub created_at: Option<DateTime<Utc>>,
    pub status: ConversationStatus,
    pub is_archived: bool,
    pub total_lines_added: i64,
    pub total_lines_removed: i64,
    pub model: Option<String>,
    /// Messages with non-empty text or attached code blocks
    pub message_count: usize,
    pub code_block_files: Vec<String>,
}

impl Conversation {
    /// Load this conversation's messages, ordered by creation time
    pub fn messages<S: ConversationSource + ?Sized>(&self, source: &S) -> Result<MessageBatch> {
        source.load_messages(&self.id)
    }

    /// Load the code diffs recorded for this conversation
    pub fn code_diffs<S: ConversationSource + ?Sized>(&self, source: &S) -> Result<Vec<CodeDiff>> {
        source.load_code_diffs(&self.id)
    }

    pub fn is_empty(&self) -> bool {
        self.message_count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn from_type_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::User),
            2 => Some(Self::Assistant),
            _ => None,
        }
    }
}

/// One turn within a conversation (a Cursor "bubble")
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub diff_text: Option<String>,
    pub rich_text: Option<String>,
    pub model: Option<String>,
    pub thinking: Option<String>,
}

/// Messages loaded for one conversation plus the count of records that failed to decode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageBatch {
    pub messages: Vec<Message>,
    pub skipped: usize,
}

/// A `codeBlockDiff:` record, flattened to the text it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeDiff {
    pub id: String,
    pub conversation_id: String,
    pub content: String,
}

#[cfg(test)]
impl Conversation {
    /// Minimal conversation for unit tests; `created_ms` of `None` means unknown time
    pub(crate) fn sample(id: &str, title: &str, created_ms: Option<i64>) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            title_source: TitleSource::Name,
            subtitle: None,
            preview: None,
            created_at: created_ms.and_then(DateTime::from_timestamp_millis),
            status: ConversationStatus::None,
            is_archived: false,
            total_lines_added: 0,
            total_lines_removed: 0,
            model: None,
            message_count: 1,
            code_block_files: Vec::new(),
        }
    }

    pub(crate) fn with_message_count(mut self, count: usize) -> Self {
        self.message_count = count;
        self
    }
}
