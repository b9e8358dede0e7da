pub mod engine;
pub mod pagination;

pub use engine::{SearchOptions, SearchResults, search};
pub use pagination::{DEFAULT_PAGE_SIZE, Page};
