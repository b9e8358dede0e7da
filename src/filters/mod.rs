pub mod apply;
pub mod query;
pub mod time;

pub use apply::{CatalogFilter, FilterOutcome, apply_filter, list_filtered, sort_most_recent_first};
pub use query::parse_search_query;
pub use time::{TimeRange, TimeReference, parse_time_expression};
