//! Reconciliation of the session document with the live scene.
//!
//! Restoring replays a persisted document onto the controllers and widgets
//! currently in the scene; closing a widget removes it from the scene and
//! records the removal in the document.

use std::rc::Rc;

use super::DesktopView;
use crate::scene::WidgetHandle;
use crate::session::{LocationEntry, SessionDocument};

impl DesktopView {
    /// Replaces the session with `serialized` and applies it to the scene.
    ///
    /// For every entry the controller is loaded (and, unless `is_first_run`,
    /// recorded as open), its saved arguments and view rect are handed back to
    /// it, child widgets are
    /// moved to their saved positions, and widgets recorded as closed are
    /// hidden. Closed widgets are collected during the pass and only removed
    /// and closed once the whole document has been applied.
    ///
    /// Malformed input is logged; entries read before the error are used.
    pub fn restore(&mut self, serialized: &str, is_first_run: bool) {
        let parsed = SessionDocument::parse_xml(serialized);
        if let Some(error) = &parsed.error {
            tracing::warn!("[DesktopView] Restoring partial session: {}", error);
        }

        self.document = parsed.document;
        let entries = self.document.entries().to_vec();

        let mut pending_close: Vec<WidgetHandle> = Vec::new();

        for entry in &entries {
            let name = entry.controller_name.as_str();

            if let Err(e) = self.add_controller(name, is_first_run) {
                tracing::debug!("[DesktopView] Restoring '{}' without controller: {}", name, e);
            }

            let controller = self.registry.get(name);

            if let (Some(args), Some(controller)) = (&entry.arguments, &controller) {
                controller.revoke_session(args);
            }

            if let (Some(rect), Some(controller)) = (entry.geometry, &controller) {
                controller.set_view_rect(rect);
            }

            for location in &entry.locations {
                self.restore_location(location);
            }

            for widget_id in entry.closed_widget_ids() {
                self.mark_closed(widget_id, &mut pending_close);
            }
        }

        for widget in pending_close {
            self.scene.remove(&widget);
            self.on_widget_closed(&widget);
        }
    }

    /// Moves every controller-owned widget with the location's id.
    fn restore_location(&self, location: &LocationEntry) {
        for widget in self.scene.items() {
            let mut widget = widget.borrow_mut();
            if widget.controller_name().is_some() && widget.id() == location.widget_id {
                widget.set_position(location.position);
            }
        }
    }

    /// Hides controller-owned widgets with `widget_id` and queues them for
    /// closing. A widget is queued at most once per pass.
    fn mark_closed(&self, widget_id: &str, pending: &mut Vec<WidgetHandle>) {
        for widget in self.scene.items() {
            let matches = {
                let w = widget.borrow();
                w.controller_name().is_some() && w.id() == widget_id
            };
            if !matches || pending.iter().any(|p| Rc::ptr_eq(p, &widget)) {
                continue;
            }

            widget.borrow_mut().hide();
            pending.push(widget);
        }
    }

    /// Closes `widget`: asks its controller to delete it, records it as
    /// closed, and takes it out of the scene.
    ///
    /// The state is recorded whether or not the controller agrees. If the
    /// controller declines (or there is none), the view disposes of the widget
    /// itself.
    pub fn on_widget_closed(&mut self, widget: &WidgetHandle) {
        let (widget_id, owner) = {
            let w = widget.borrow();
            (w.id().to_string(), w.controller_name().map(str::to_string))
        };

        let mut deleted = false;

        if let Some(owner) = owner {
            if let Some(controller) = self.registry.get(&owner) {
                deleted = controller.delete_widget(widget);
            }
            self.record_widget_state(&owner, &widget_id, true);
        }

        self.scene.remove(widget);

        if !deleted {
            tracing::debug!("[DesktopView] Disposing widget '{}' left by its controller", widget_id);
            widget.borrow_mut().dispose();
        }
    }

    /// Closes the scene widget with `widget_id`.
    ///
    /// Returns false if no such widget is in the scene.
    pub fn close_widget(&mut self, widget_id: &str) -> bool {
        match self.scene.find(widget_id) {
            Some(widget) => {
                self.on_widget_closed(&widget);
                true
            }
            None => {
                tracing::debug!("[DesktopView] No widget '{}' to close", widget_id);
                false
            }
        }
    }
}
