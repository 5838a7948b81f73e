//! Session persistence and controller lifecycle for the PlexyDesk desktop.
//!
//! The [`view::DesktopView`] owns a [`session::SessionDocument`], a
//! [`controller::ControllerRegistry`] and a [`scene::Scene`]. Controllers are
//! obtained by name from a [`controller::ControllerResolver`]; every change to
//! the session is serialized to XML and handed to subscribers, typically a
//! [`session::SessionStore`].

pub mod config;
pub mod controller;
pub mod error;
pub mod geometry;
pub mod scene;
pub mod session;
pub mod view;

// Re-export common types
pub use config::DesktopConfig;
pub use controller::{Controller, ControllerCatalog, ControllerHandle, ControllerResolver};
pub use error::{PlexyError, Result};
pub use geometry::{Point, Rect};
pub use scene::{DesktopWidget, Scene, WidgetHandle};
pub use session::{SessionDocument, SessionStore};
pub use view::DesktopView;
