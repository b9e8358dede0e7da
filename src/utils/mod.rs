pub mod environment;
pub mod terminal;
pub mod text;

pub use environment::{DB_PATH_ENV, format_path_with_tilde, get_cursor_db_path, resolve_db_path};
pub use terminal::{sanitize_for_terminal, sanitize_inline};
pub use text::{first_line, truncate_text};
