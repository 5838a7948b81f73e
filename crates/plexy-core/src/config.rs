use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::controller::Viewport;
use crate::geometry::Rect;

/// Desktop configuration, stored as `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DesktopConfig {
    /// Controller drawn behind all widgets.
    pub background_controller: Option<String>,
    /// Controllers loaded when no session has been saved yet.
    pub default_controllers: Vec<String>,
    /// Overrides the default session file location.
    pub session_file: Option<PathBuf>,
    #[serde(rename = "screen")]
    pub screens: Vec<Rect>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            background_controller: None,
            default_controllers: Vec::new(),
            session_file: None,
            screens: vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)],
        }
    }
}

impl DesktopConfig {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.screens.clone())
    }
}
