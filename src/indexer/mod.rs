//! Catalog building for the Cursor conversation store
//!
//! # Error Handling Strategy
//!
//! The builder combines fail-loud store access with fail-soft record decoding:
//!
//! - **Store-level failures**: opening or scanning the store returns an error and no
//!   partial catalog is produced.
//!
//! - **Record-level failures**: a conversation or message that does not decode is
//!   skipped and counted in the [`DecodeReport`](crate::parsers::DecodeReport), so the
//!   caller can tell a complete catalog from one with gaps.
//!
//! - **Summary reporting**: a single `info` event reports how many conversations and
//!   messages were read and how many were skipped.

pub mod builder;

pub use builder::{Catalog, build_catalog};
