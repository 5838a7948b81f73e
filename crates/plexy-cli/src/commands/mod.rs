pub mod config;
pub mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use plexy_infrastructure::{ConfigService, FileSessionStore, PlexyPaths};

/// Resolves the files a command works on.
pub struct CliContext {
    paths: PlexyPaths,
}

impl CliContext {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            paths: PlexyPaths::new(dir),
        }
    }

    pub fn config_service(&self) -> Result<ConfigService> {
        let path = self
            .paths
            .config_file()
            .context("Failed to locate config.toml")?;
        Ok(ConfigService::new(path))
    }

    /// The session store, honoring `session_file` from the configuration.
    ///
    /// Reads the configuration without creating a default file.
    pub fn session_store(&self) -> Result<FileSessionStore> {
        let config = self
            .config_service()?
            .read_config()
            .context("Failed to load configuration")?;
        let path = self
            .paths
            .session_file_for(config.session_file.as_deref())
            .context("Failed to locate session file")?;
        tracing::debug!("[CLI] Using session file {:?}", path);
        Ok(FileSessionStore::new(path))
    }
}
