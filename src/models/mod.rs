//! Data models for Cursor's conversation store.
//!
//! - [`RawComposer`] / [`RawBubble`] - payloads as stored under `composerData:` and
//!   `bubbleId:` keys, decoded leniently with serde
//! - [`Conversation`] / [`Message`] - the normalized entities every other module works on
//! - [`SearchQuery`] / [`SearchHit`] - parsed search input and per-conversation results
//!
//! Raw timestamps are normalized by the `deserializers` module before any of these
//! types are built, so downstream code only ever sees `Option<DateTime<Utc>>`.

pub mod conversation;
pub mod raw;
pub mod search;

pub use conversation::{CodeDiff, Conversation, ConversationStatus, Message, MessageBatch, Role, TitleSource};
pub use raw::{RawBubble, RawComposer};
pub use search::{FieldMatch, MatchedField, SearchHit, SearchQuery, SearchTerm, TermKind};
