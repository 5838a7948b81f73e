//! Desktop view: owner of the session document, the controller registry and
//! the scene.
//!
//! Every document mutation goes through [`DesktopView`], which serializes the
//! document and notifies subscribers synchronously before returning.

mod reconcile;


use std::rc::Rc;

use crate::controller::{ControllerHandle, ControllerRegistry, ControllerResolver, DropEvent, Viewport};
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::scene::{Scene, WidgetHandle};
use crate::session::{CONTROLLER_WIDGET_ID, SessionDocument, SessionNotifier, SessionStore, WidgetEntry};

/// The desktop orchestrator.
///
/// `DesktopView` is responsible for:
/// - Loading controllers by name and keeping one live instance per name
/// - Recording controller geometry, arguments and child widget state in the
///   session document
/// - Restoring a persisted session against the live scene
/// - Broadcasting the serialized document after every change
pub struct DesktopView {
    document: SessionDocument,
    registry: ControllerRegistry,
    scene: Scene,
    resolver: Box<dyn ControllerResolver>,
    notifier: SessionNotifier,
    viewport: Viewport,
    background_controller: Option<String>,
    background_view: Option<WidgetHandle>,
}

impl DesktopView {
    /// Creates a view with an empty session and an empty scene.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Source of controller instances
    /// * `viewport` - Screen layout handed to every controller
    pub fn new(resolver: impl ControllerResolver + 'static, viewport: Viewport) -> Self {
        Self {
            document: SessionDocument::new(),
            registry: ControllerRegistry::new(),
            scene: Scene::new(),
            resolver: Box::new(resolver),
            notifier: SessionNotifier::new(),
            viewport,
            background_controller: None,
            background_view: None,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn document(&self) -> &SessionDocument {
        &self.document
    }

    /// The current document in its persisted form.
    pub fn session_xml(&self) -> Result<String> {
        self.document.to_xml()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn background_controller_name(&self) -> Option<&str> {
        self.background_controller.as_deref()
    }

    // ============================================================================
    // Notifications
    // ============================================================================

    /// Registers a listener for the serialized document.
    pub fn subscribe(&mut self, listener: impl FnMut(&str) + 'static) {
        self.notifier.subscribe(listener);
    }

    /// Saves every document change to `store`. Save failures are logged.
    pub fn persist_to<S: SessionStore + 'static>(&mut self, store: Rc<S>) {
        self.subscribe(move |xml| {
            if let Err(e) = store.save(xml) {
                tracing::warn!("[DesktopView] Failed to save session: {}", e);
            }
        });
    }

    fn notify_session_updated(&mut self) {
        match self.document.to_xml() {
            Ok(xml) => self.notifier.notify(&xml),
            Err(e) => tracing::warn!("[DesktopView] Session not broadcast: {}", e),
        }
    }

    // ============================================================================
    // Controllers
    // ============================================================================

    /// Loads and attaches the controller `name`.
    ///
    /// Does nothing if the controller is already registered. Unless
    /// `first_run` is set, the controller is recorded in the session with a
    /// controller-level state entry.
    ///
    /// # Errors
    ///
    /// Returns `PlexyError::ControllerUnavailable` if the resolver cannot
    /// produce the controller; nothing is registered or recorded then.
    pub fn add_controller(&mut self, name: &str, first_run: bool) -> Result<()> {
        if self.registry.contains(name) {
            return Ok(());
        }

        let controller = self.resolver.resolve(name).inspect_err(|e| {
            tracing::warn!("[DesktopView] Error loading extension '{}': {}", name, e);
        })?;

        self.registry.insert(name, controller.clone());

        if let Some(view) = controller.default_view() {
            {
                let mut widget = view.borrow_mut();
                if widget.controller_name().is_none() {
                    widget.set_controller_name(name);
                }
                widget.show();
            }
            self.scene.add(view);
        }

        controller.set_viewport(&self.viewport);
        controller.set_controller_name(name);
        self.refocus_background();

        tracing::debug!("[DesktopView] Added controller '{}' (first_run: {})", name, first_run);

        if !first_run {
            self.record_controller_entry(name);
        }

        Ok(())
    }

    /// Loads `name` as the desktop background and places its view behind
    /// everything else, filling the primary screen.
    ///
    /// A previously set background view is taken out of the scene.
    pub fn set_background_controller(&mut self, name: &str) -> Result<()> {
        let controller = self.resolver.resolve(name).inspect_err(|e| {
            tracing::warn!("[DesktopView] Error loading background '{}': {}", name, e);
        })?;

        if let Some(previous) = self.background_view.take() {
            self.scene.remove(&previous);
        }

        self.registry.insert(name, controller.clone());
        self.background_controller = Some(name.to_string());

        if let Some(view) = controller.default_view() {
            {
                let mut widget = view.borrow_mut();
                if let Some(screen) = self.viewport.primary() {
                    widget.set_content_rect(screen);
                }
                if widget.controller_name().is_none() {
                    widget.set_controller_name(name);
                }
                widget.set_z_value(-1.0);
                widget.show();
            }
            self.scene.add(view.clone());
            self.background_view = Some(view);
        }

        controller.set_viewport(&self.viewport);
        controller.set_controller_name(name);
        self.refocus_background();

        Ok(())
    }

    /// Returns the registered controller, if any. Never constructs.
    pub fn controller(&self, name: &str) -> Option<ControllerHandle> {
        self.registry.get(name)
    }

    /// Names of registered controllers, excluding the background controller.
    pub fn controller_names(&self) -> Vec<String> {
        self.registry
            .names_except(self.background_controller.as_deref())
    }

    fn refocus_background(&mut self) {
        if let Some(view) = &self.background_view {
            let id = view.borrow().id().to_string();
            self.scene.set_focus(Some(&id));
        }
    }

    /// Ensures an entry exists for `name` and marks the controller itself open.
    fn record_controller_entry(&mut self, name: &str) {
        if !self.document.contains_controller(name) {
            self.document.append_entry(WidgetEntry::new(name));
        }
        self.record_widget_state(name, CONTROLLER_WIDGET_ID, false);
    }

    // ============================================================================
    // Session recording
    // ============================================================================

    /// Appends a new session entry with `rect` for `controller_name` and
    /// applies the rect to the controller if it is loaded.
    pub fn record_controller_rect(&mut self, controller_name: &str, rect: Rect) {
        if let Some(controller) = self.registry.get(controller_name) {
            controller.set_view_rect(rect);
        }

        self.document.append_controller_rect(controller_name, rect);
        self.notify_session_updated();
    }

    /// Records the position of child widget `widget_id`.
    ///
    /// Silently skipped when the session has no entry for the controller.
    pub fn record_widget_location(&mut self, controller_name: &str, position: Point, widget_id: &str) {
        if !self
            .document
            .set_widget_location(controller_name, position, widget_id)
        {
            tracing::debug!(
                "[DesktopView] No session entry for '{}', location of '{}' not recorded",
                controller_name,
                widget_id
            );
        }
        self.notify_session_updated();
    }

    /// Records whether child widget `widget_id` is closed.
    ///
    /// Silently skipped when the session has no entry for the controller.
    pub fn record_widget_state(&mut self, controller_name: &str, widget_id: &str, closed: bool) {
        if !self
            .document
            .set_widget_state(controller_name, widget_id, closed)
        {
            tracing::debug!(
                "[DesktopView] No session entry for '{}', state of '{}' not recorded",
                controller_name,
                widget_id
            );
        }
        self.notify_session_updated();
    }

    /// Stores `key = value` in the arguments of every entry for
    /// `controller_name`.
    ///
    /// Keys that are not valid XML names are rejected with a warning and
    /// nothing is recorded or broadcast.
    pub fn record_argument(&mut self, controller_name: &str, key: &str, value: &str) {
        if !WidgetEntry::is_valid_argument_key(key) {
            tracing::warn!(
                "[DesktopView] Argument key '{}' for '{}' is not a valid XML name, not recorded",
                key,
                controller_name
            );
            return;
        }

        if self.document.set_argument(controller_name, key, value) == 0 {
            tracing::debug!(
                "[DesktopView] No session entry for '{}', argument '{}' not recorded",
                controller_name,
                key
            );
        }
        self.notify_session_updated();
    }

    // ============================================================================
    // Scene
    // ============================================================================

    /// Shows a controller-created widget at `position` and records it as open.
    pub fn add_widget_to_view(&mut self, widget: WidgetHandle, position: Point) {
        let (widget_id, owner) = {
            let mut w = widget.borrow_mut();
            w.set_position(position);
            w.show();
            (w.id().to_string(), w.controller_name().map(str::to_string))
        };

        self.scene.add(widget);

        if let Some(owner) = owner {
            self.record_widget_state(&owner, &widget_id, false);
        }
    }

    /// Forwards a drop to the controller of the topmost widget under the drop
    /// point.
    ///
    /// Returns false when no controller-owned widget is under the point.
    pub fn drop_event(&self, event: &DropEvent) -> bool {
        for widget in self.scene.items_at(event.position) {
            let owner = widget.borrow().controller_name().map(str::to_string);
            let Some(controller) = owner.as_deref().and_then(|name| self.registry.get(name)) else {
                continue;
            };

            controller.handle_drop_event(&widget, event);
            return true;
        }
        false
    }
}
