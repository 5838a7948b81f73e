//! In-memory scene graph.
//!
//! The scene is the set of live widgets the desktop view shows. It owns one
//! handle per widget; controllers may keep their own handles to the same
//! widgets.

mod widget;

pub use widget::{DesktopWidget, WidgetHandle};

use std::rc::Rc;

use crate::geometry::Point;

/// Ordered collection of live widgets. Insertion order is stacking order for
/// widgets with equal z value.
#[derive(Debug, Default)]
pub struct Scene {
    items: Vec<WidgetHandle>,
    focus: Option<String>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `widget` unless a widget with the same handle is already present.
    pub fn add(&mut self, widget: WidgetHandle) {
        if self.items.iter().any(|w| Rc::ptr_eq(w, &widget)) {
            return;
        }
        self.items.push(widget);
    }

    /// Removes `widget` from the scene.
    ///
    /// Matches the handle itself, so other widgets sharing its id stay.
    /// Returns false if the handle was not in the scene.
    pub fn remove(&mut self, widget: &WidgetHandle) -> bool {
        let Some(index) = self.items.iter().position(|w| Rc::ptr_eq(w, widget)) else {
            return false;
        };
        let removed = self.items.remove(index);
        if self.focus.as_deref() == Some(removed.borrow().id()) {
            self.focus = None;
        }
        true
    }

    pub fn find(&self, widget_id: &str) -> Option<WidgetHandle> {
        self.items
            .iter()
            .find(|w| w.borrow().id() == widget_id)
            .cloned()
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.items.iter().any(|w| w.borrow().id() == widget_id)
    }

    /// Snapshot of all widget handles, in insertion order.
    pub fn items(&self) -> Vec<WidgetHandle> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Visible widgets under `point`, topmost first.
    pub fn items_at(&self, point: Point) -> Vec<WidgetHandle> {
        let mut hits: Vec<(usize, WidgetHandle)> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, w)| {
                let w = w.borrow();
                w.is_visible() && w.bounds().contains(point)
            })
            .map(|(i, w)| (i, w.clone()))
            .collect();

        hits.sort_by(|(ia, a), (ib, b)| {
            let (za, zb) = (a.borrow().z_value(), b.borrow().z_value());
            zb.total_cmp(&za).then(ib.cmp(ia))
        });
        hits.into_iter().map(|(_, w)| w).collect()
    }

    pub fn set_focus(&mut self, widget_id: Option<&str>) {
        self.focus = widget_id.map(str::to_string);
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }
}
