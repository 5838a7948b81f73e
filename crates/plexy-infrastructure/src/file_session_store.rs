//! File-backed SessionStore implementation.

use std::path::{Path, PathBuf};

use plexy_core::{Result, SessionStore};

use crate::paths::PlexyPaths;
use crate::storage::AtomicTextFile;

/// Stores the serialized session as a single XML file.
///
/// Every save atomically replaces the file, so a crash mid-write leaves the
/// previous session intact. Saves and updates hold an exclusive lock on a
/// sibling `.lock` file, so a desktop and a maintenance tool never interleave.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    file: AtomicTextFile,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTextFile::new(path.into()),
        }
    }

    /// Creates a store at the default location (`~/.config/plexydesk/session.xml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined.
    pub fn default_location() -> Result<Self> {
        let path = PlexyPaths::default().session_file()?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Rewrites the stored session under an exclusive file lock.
    ///
    /// `f` receives the stored session (`None` if there is none) and returns
    /// the replacement, or `None` to leave the file as it is.
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(Option<String>) -> Option<String>,
    {
        self.file.update(f)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        let content = self.file.load()?;
        tracing::debug!(
            "[FileSessionStore] Loaded session from {:?} (present: {})",
            self.path(),
            content.is_some()
        );
        Ok(content)
    }

    fn save(&self, xml: &str) -> Result<()> {
        self.file.save_locked(xml)?;
        tracing::trace!("[FileSessionStore] Saved {} bytes", xml.len());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::info!("[FileSessionStore] Removed session file {:?}", self.path());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_run_has_no_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.xml"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.xml"));

        store.save("<session>\n <widget controller=\"clock\"/>\n</session>").unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert!(loaded.contains("controller=\"clock\""));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_update_rewrites_under_lock() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.xml"));

        store.update(|current| current.map(|xml| xml + "!")).unwrap();
        assert!(store.load().unwrap().is_none());

        store.save("<session/>").unwrap();
        store
            .update(|current| current.map(|xml| xml.replace("/>", "></session>")))
            .unwrap();

        assert_eq!(
            store.load().unwrap().as_deref(),
            Some("<session></session>")
        );
        assert!(!temp_dir.path().join("session.lock").exists());
    }
}
