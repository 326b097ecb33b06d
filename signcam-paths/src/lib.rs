//! XDG Base Directory and home paths for signcam.
//!
//! The launcher is a Linux CLI tool, so it uses XDG paths rather than
//! platform-native ones, the same as `systemctl --user` and friends.

use std::path::{Path, PathBuf};

/// Get the signcam config directory.
///
/// Returns `$XDG_CONFIG_HOME/signcam` if set, otherwise `~/.config/signcam`.
///
/// # Examples
///
/// ```
/// use signcam_paths::config_dir;
///
/// let config = config_dir();
/// let user_config = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("signcam")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/signcam")
    } else {
        PathBuf::from(".config/signcam")
    }
}

/// Get the invoking user's home directory.
///
/// Falls back to `/` when no home directory can be determined, which is
/// where a login shell without `$HOME` would land too.
pub fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"))
}

/// Expand a leading `~` or `~/` against [`home_dir`].
///
/// Any other path is returned unchanged. `~user` forms are not supported.
///
/// # Examples
///
/// ```
/// use signcam_paths::{expand_home, home_dir};
///
/// assert_eq!(expand_home("~/app"), home_dir().join("app"));
/// assert_eq!(expand_home("/opt/app"), std::path::PathBuf::from("/opt/app"));
/// ```
pub fn expand_home(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home_dir(),
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
