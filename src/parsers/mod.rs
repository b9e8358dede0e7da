//! Decoding of Cursor store payloads
//!
//! # Error Handling Strategy
//!
//! Decoding follows a **fail soft per record** approach:
//!
//! - **Individual record failures**: A payload that is not JSON, has a field of the wrong
//!   type, or lacks a required field (message role) yields a [`RecordDecodeError`]. The
//!   caller logs it, counts it in a [`DecodeReport`], and keeps going.
//!
//! - **Unknown fields** are ignored and missing optional fields take defaults, so records
//!   written by older or newer Cursor versions still decode.
//!
//! - **Timestamps** are normalized here (epoch millis or ISO-8601) and never fail a
//!   record; an unparseable timestamp simply becomes unknown.
//!
//! Store-level failures (missing file, lock contention) are not handled here; see
//! [`crate::store`].

pub mod deserializers;
pub mod mapper;

pub use deserializers::{RawTimestamp, deserialize_lenient_timestamp};
pub use mapper::{
    DecodeReport, MappedConversation, MessageDigest, RecordDecodeError, decode_code_diff,
    decode_conversation, decode_message, finalize_conversation, order_messages,
};
