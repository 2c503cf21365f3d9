//! Path helpers shared by the tools.

use crate::error::{Result, ToolError};
use camino::{Utf8Path, Utf8PathBuf};

pub fn home_dir() -> Result<Utf8PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ToolError::Configuration("cannot determine home directory".to_string()))?;
    Utf8PathBuf::from_path_buf(home)
        .map_err(|p| ToolError::Configuration(format!("home directory is not UTF-8: {}", p.display())))
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> Result<Utf8PathBuf> {
    if path == "~" {
        return home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(home_dir()?.join(rest)),
        None => Ok(Utf8PathBuf::from(path)),
    }
}

/// Join `path` onto `prefix` unless it is already absolute.
pub fn prepend_if_relative(prefix: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        prefix.join(path)
    }
}
