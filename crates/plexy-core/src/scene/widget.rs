use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use crate::geometry::{Point, Rect};

/// Shared handle to a live widget. The scene and the owning controller may
/// both hold one.
pub type WidgetHandle = Rc<RefCell<DesktopWidget>>;

/// A visible item on the desktop, created and owned by a controller.
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopWidget {
    id: String,
    controller: Option<String>,
    position: Point,
    width: f64,
    height: f64,
    z_value: f64,
    visible: bool,
    closed: bool,
}

impl DesktopWidget {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            controller: None,
            position: Point::default(),
            width: 0.0,
            height: 0.0,
            z_value: 0.0,
            visible: false,
            closed: false,
        }
    }

    /// Creates a widget with a random v4 UUID as its id.
    pub fn with_generated_id() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    /// Sets the owning controller's name.
    pub fn owned_by(mut self, controller_name: impl Into<String>) -> Self {
        self.controller = Some(controller_name.into());
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn into_handle(self) -> WidgetHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn controller_name(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    pub fn set_controller_name(&mut self, name: impl Into<String>) {
        self.controller = Some(name.into());
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn z_value(&self) -> f64 {
        self.z_value
    }

    pub fn set_z_value(&mut self, z: f64) {
        self.z_value = z;
    }

    /// Moves and resizes the widget to fill `rect`.
    pub fn set_content_rect(&mut self, rect: Rect) {
        self.position = rect.origin();
        self.width = rect.width;
        self.height = rect.height;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Marks the widget as disposed. A disposed widget never becomes visible
    /// again.
    pub fn dispose(&mut self) {
        self.visible = false;
        self.closed = true;
    }
}
