//! File-backed infrastructure for the PlexyDesk session core: paths,
//! atomic storage, the session store, configuration loading and startup.

pub mod config_service;
pub mod desktop_bootstrap;
pub mod file_session_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::desktop_bootstrap::start_desktop;
pub use crate::file_session_store::FileSessionStore;
pub use crate::paths::{PathError, PlexyPaths};
