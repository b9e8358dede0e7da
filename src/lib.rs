//! Cursor History Explorer - Browse, search and summarize Cursor agent conversations
//!
//! This library reads the conversation records Cursor keeps in its `state.vscdb`
//! SQLite store and exposes them as typed entities. It supports:
//!
//! - Read-only, streaming access to the store's key-value table
//! - Mapping raw JSON records to conversations and lazily loaded messages
//! - Relative and absolute time range filters
//! - Resolving an id, id prefix or title to one conversation
//! - Keyword and phrase search with AND semantics and pagination
//! - Message-count statistics with percentiles, buckets and weekly breakdowns
//!
//! # Example
//!
//! ```no_run
//! use cursor_history_explorer::{Store, build_catalog, parse_search_query};
//! use cursor_history_explorer::search::{SearchOptions, search};
//! use std::path::Path;
//!
//! let store = Store::open(Path::new("state.vscdb"))?;
//! let catalog = build_catalog(&store)?;
//! let query = parse_search_query("\"database migration\" postgres")?;
//! let results = search(&catalog.conversations, &store, &query, &SearchOptions::default())?;
//! println!("{} matching conversations", results.page.total_count);
//! # Ok::<(), cursor_history_explorer::Error>(())
//! ```

pub mod cli;
pub mod error;
pub mod filters;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod resolver;
pub mod search;
pub mod stats;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use error::{Error, Result};
pub use filters::{CatalogFilter, TimeRange, TimeReference, parse_search_query, parse_time_expression};
pub use indexer::{Catalog, build_catalog};
pub use models::{Conversation, Message, SearchQuery};
pub use resolver::{Resolution, resolve};
pub use store::{ConversationSource, Store};
pub use utils::format_path_with_tilde;
