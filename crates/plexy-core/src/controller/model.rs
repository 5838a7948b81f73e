use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::scene::WidgetHandle;

/// Shared handle to a controller instance. The registry and the scene both
/// reference the same instance.
pub type ControllerHandle = Rc<dyn Controller>;

/// Arguments restored from a session `arg` block.
pub type SessionArgs = BTreeMap<String, String>;

/// Screen layout handed to controllers when they are attached to a view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub screens: Vec<Rect>,
}

impl Viewport {
    pub fn new(screens: Vec<Rect>) -> Self {
        Self { screens }
    }

    /// Geometry of the primary screen, if any.
    pub fn primary(&self) -> Option<Rect> {
        self.screens.first().copied()
    }
}

/// Something dropped onto the desktop.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DropEvent {
    pub position: Point,
    pub mime_type: String,
    pub payload: String,
}

impl DropEvent {
    pub fn new(position: Point, mime_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            position,
            mime_type: mime_type.into(),
            payload: payload.into(),
        }
    }
}

/// Capability set of a plugin-provided controller.
///
/// All methods take `&self`; controllers keep their mutable state behind
/// interior mutability since the registry and the scene share them.
pub trait Controller {
    /// The widget shown when the controller is added, if it has one.
    fn default_view(&self) -> Option<WidgetHandle>;

    fn set_viewport(&self, viewport: &Viewport);

    fn set_controller_name(&self, name: &str);

    fn controller_name(&self) -> String;

    fn set_view_rect(&self, rect: Rect);

    /// Resumes the controller from arguments saved in a previous session.
    fn revoke_session(&self, args: &SessionArgs);

    /// Asks the controller to dispose of `widget`.
    ///
    /// Returns false when the controller declined; the view then disposes of
    /// the widget itself.
    fn delete_widget(&self, widget: &WidgetHandle) -> bool;

    fn handle_drop_event(&self, widget: &WidgetHandle, event: &DropEvent);
}
