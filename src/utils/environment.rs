use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable overriding the store location
pub const DB_PATH_ENV: &str = "CURSOR_DB_PATH";

/// Resolve the Cursor store path: explicit flag, then `CURSOR_DB_PATH`, then the
/// platform default under the user's config directory
pub fn resolve_db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env::var_os(DB_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    get_cursor_db_path()
}

/// Default location of Cursor's global state database
///
/// - Linux: `~/.config/Cursor/User/globalStorage/state.vscdb`
/// - macOS: `~/Library/Application Support/Cursor/User/globalStorage/state.vscdb`
/// - Windows: `%APPDATA%\Cursor\User\globalStorage\state.vscdb`
pub fn get_cursor_db_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine the user config directory")?;
    Ok(default_db_path_in(&config_dir))
}

pub(crate) fn default_db_path_in(config_dir: &Path) -> PathBuf {
    config_dir.join("Cursor").join("User").join("globalStorage").join("state.vscdb")
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, dirs::home_dir().as_deref())
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        return Path::new("~").join(rest).to_string_lossy().into_owned();
    }
    path.to_string_lossy().into_owned()
}
