//! Configuration service implementation.
//!
//! Loads the desktop configuration from `config.toml` in the PlexyDesk config
//! directory, writing a default file on first use.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use plexy_core::{DesktopConfig, PlexyError, Result};

use crate::storage::AtomicTextFile;

/// Configuration service that loads and caches the desktop configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicTextFile,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<DesktopConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTextFile::new(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// A missing file is created with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `PlexyError::Config` if the file cannot be parsed, and
    /// `PlexyError::Io` if it cannot be read or created.
    pub fn get_config(&self) -> Result<DesktopConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| PlexyError::internal("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;

        {
            let mut write_lock = self
                .config
                .write()
                .map_err(|_| PlexyError::internal("config cache lock poisoned"))?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Gets the configuration without touching the filesystem beyond reading.
    ///
    /// A missing file yields the default configuration, which is neither
    /// written nor cached.
    pub fn read_config(&self) -> Result<DesktopConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| PlexyError::internal("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let Some(text) = self.file.load()? else {
            return Ok(DesktopConfig::default());
        };
        let loaded = self.parse(&text)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| PlexyError::internal("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Writes `config` to disk and replaces the cached copy.
    pub fn save(&self, config: &DesktopConfig) -> Result<()> {
        let text = toml::to_string_pretty(config)?;
        self.file.save(&text)?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| PlexyError::internal("config cache lock poisoned"))?;
        *write_lock = Some(config.clone());

        tracing::info!("[ConfigService] Saved configuration to {:?}", self.path());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        match self.config.write() {
            Ok(mut write_lock) => *write_lock = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    fn load_config(&self) -> Result<DesktopConfig> {
        match self.file.load()? {
            Some(text) => self.parse(&text),
            None => {
                let default_config = DesktopConfig::default();
                let text = toml::to_string_pretty(&default_config)?;
                self.file.save(&text)?;
                tracing::info!(
                    "[ConfigService] Created default configuration at {:?}",
                    self.path()
                );
                Ok(default_config)
            }
        }
    }

    fn parse(&self, text: &str) -> Result<DesktopConfig> {
        toml::from_str(text)
            .map_err(|e| PlexyError::config(format!("Failed to parse {:?}: {}", self.path(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_creates_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(&path);

        let config = service.get_config().unwrap();

        assert_eq!(config, DesktopConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_read_config_does_not_create_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(&path);

        assert_eq!(service.read_config().unwrap(), DesktopConfig::default());
        assert!(!path.exists());

        std::fs::write(&path, "default_controllers = [\"clock\"]\n").unwrap();
        assert_eq!(
            service.read_config().unwrap().default_controllers,
            vec!["clock"]
        );
    }

    #[test]
    fn test_cache_and_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "background_controller = \"wallpaper\"\n").unwrap();
        let service = ConfigService::new(&path);

        assert_eq!(
            service.get_config().unwrap().background_controller.as_deref(),
            Some("wallpaper")
        );

        std::fs::write(&path, "background_controller = \"photoframe\"\n").unwrap();
        assert_eq!(
            service.get_config().unwrap().background_controller.as_deref(),
            Some("wallpaper")
        );

        service.invalidate_cache();
        assert_eq!(
            service.get_config().unwrap().background_controller.as_deref(),
            Some("photoframe")
        );
    }

    #[test]
    fn test_save_updates_cache() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        let config = DesktopConfig {
            default_controllers: vec!["clock".to_string()],
            ..Default::default()
        };

        service.save(&config).unwrap();
        service.invalidate_cache();

        assert_eq!(service.get_config().unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "default_controllers = 3\n").unwrap();

        let err = ConfigService::new(&path).get_config().unwrap_err();

        assert!(err.is_config());
    }
}
