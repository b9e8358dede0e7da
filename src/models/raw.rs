use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Conversation metadata stored under `composerData:<id>`
///
/// Every field is optional: older Cursor builds omit most of them and newer ones add
/// fields this crate ignores.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawComposer {
    pub composer_id: Option<String>,
    pub name: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub is_archived: Option<bool>,
    pub total_lines_added: Option<i64>,
    pub total_lines_removed: Option<i64>,
    /// Unsent draft text of the composer input box
    pub text: Option<String>,
    /// `{ file_uri: { code_block_id: { bubbleId, ... } } }`
    pub code_block_data: Option<Value>,
    pub model_config: Option<RawModelConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawModelConfig {
    pub model_name: Option<String>,
}

/// One message stored under `bubbleId:<conversationId>:<messageId>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawBubble {
    pub bubble_id: Option<String>,
    /// 1 = user, 2 = assistant
    #[serde(rename = "type")]
    pub type_code: Option<i64>,
    pub text: Option<String>,
    pub rich_text: Option<Value>,
    #[serde(deserialize_with = "crate::parsers::deserializers::deserialize_lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "diff")]
    pub diff_text: Option<String>,
    pub model_info: Option<RawModelInfo>,
    pub thinking: Option<RawThinking>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawModelInfo {
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawThinking {
    pub text: Option<String>,
}
