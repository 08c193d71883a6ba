//! Small platform helpers that would otherwise pull in extra crates.

use std::path::PathBuf;

/// The current user's home directory.
///
/// Reads `HOME` (or `USERPROFILE` on Windows). Returns `None` when neither
/// is set or the value is empty.
pub fn home_dir() -> Option<PathBuf> {
    home_dir_with(|key| std::env::var(key).ok())
}

/// Resolve the home directory through a custom variable lookup.
pub fn home_dir_with(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let keys: &[&str] = if cfg!(windows) {
        &["USERPROFILE", "HOME"]
    } else {
        &["HOME"]
    };
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// The per-user configuration directory.
///
/// `$XDG_CONFIG_HOME` when set, otherwise `~/.config`.
pub fn config_dir() -> Option<PathBuf> {
    config_dir_with(|key| std::env::var(key).ok())
}

/// Resolve the configuration directory through a custom variable lookup.
pub fn config_dir_with(lookup: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(xdg) = lookup("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(xdg));
    }
    home_dir_with(lookup).map(|home| home.join(".config"))
}
