//! Path management for PlexyDesk configuration and session files.
//!
//! ```text
//! ~/.config/plexydesk/         # Config directory
//! ├── config.toml              # Desktop configuration
//! └── session.xml              # Persisted desktop session
//! ```
//!
//! Every path can be rebased onto an explicit directory, which is what the
//! CLI's `--dir` flag and the tests use.

use std::path::{Path, PathBuf};

use plexy_core::PlexyError;

const APP_DIR: &str = "plexydesk";
const CONFIG_FILE: &str = "config.toml";
const SESSION_FILE: &str = "session.xml";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for PlexyError {
    fn from(err: PathError) -> Self {
        PlexyError::config(err.to_string())
    }
}

/// Resolves PlexyDesk file locations.
#[derive(Debug, Clone, Default)]
pub struct PlexyPaths {
    base_dir: Option<PathBuf>,
}

impl PlexyPaths {
    /// # Arguments
    ///
    /// * `base_dir` - Directory to use instead of the platform config directory
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Returns the PlexyDesk configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: The override directory, or e.g. `~/.config/plexydesk/`
    /// - `Err(PathError::ConfigDirNotFound)`: No override and no platform config dir
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    /// Default session file location.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(SESSION_FILE))
    }

    /// Session file location honoring a configured override.
    ///
    /// Relative overrides are resolved against the config directory.
    pub fn session_file_for(&self, configured: Option<&Path>) -> Result<PathBuf, PathError> {
        match configured {
            Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
            Some(path) => Ok(self.config_dir()?.join(path)),
            None => self.session_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_override() {
        let paths = PlexyPaths::new(Some(PathBuf::from("/tmp/plexy-test")));
        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/plexy-test/config.toml")
        );
        assert_eq!(
            paths.session_file().unwrap(),
            PathBuf::from("/tmp/plexy-test/session.xml")
        );
    }

    #[test]
    fn test_session_file_override() {
        let paths = PlexyPaths::new(Some(PathBuf::from("/tmp/plexy-test")));
        assert_eq!(
            paths
                .session_file_for(Some(Path::new("sessions/work.xml")))
                .unwrap(),
            PathBuf::from("/tmp/plexy-test/sessions/work.xml")
        );
        assert_eq!(
            paths
                .session_file_for(Some(Path::new("/var/lib/plexy/s.xml")))
                .unwrap(),
            PathBuf::from("/var/lib/plexy/s.xml")
        );
    }
}
