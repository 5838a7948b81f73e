//! Session document domain model.
//!
//! The document mirrors the persisted XML layout one-to-one: a flat, ordered
//! list of widget entries, each keyed by its controller name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Widget id used for state recorded against the controller itself rather
/// than one of its child widgets.
pub const CONTROLLER_WIDGET_ID: &str = "0";

/// Position of one child widget of a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub widget_id: String,
    pub position: Point,
}

/// Closed flag of one child widget of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub widget_id: String,
    pub closed: bool,
}

/// Persisted record of one controller instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WidgetEntry {
    pub controller_name: String,
    pub geometry: Option<Rect>,
    /// The `arg` block. `None` when the entry never received an argument.
    pub arguments: Option<BTreeMap<String, String>>,
    pub locations: Vec<LocationEntry>,
    pub states: Vec<StateEntry>,
}

impl WidgetEntry {
    pub fn new(controller_name: impl Into<String>) -> Self {
        Self {
            controller_name: controller_name.into(),
            ..Default::default()
        }
    }

    pub fn with_geometry(controller_name: impl Into<String>, rect: Rect) -> Self {
        Self {
            geometry: Some(rect),
            ..Self::new(controller_name)
        }
    }

    /// Inserts or updates the location of `widget_id`.
    pub fn upsert_location(&mut self, widget_id: &str, position: Point) {
        match self.locations.iter_mut().find(|l| l.widget_id == widget_id) {
            Some(location) => location.position = position,
            None => self.locations.push(LocationEntry {
                widget_id: widget_id.to_string(),
                position,
            }),
        }
    }

    /// Inserts or updates the closed flag of `widget_id`.
    pub fn upsert_state(&mut self, widget_id: &str, closed: bool) {
        match self.states.iter_mut().find(|s| s.widget_id == widget_id) {
            Some(state) => state.closed = closed,
            None => self.states.push(StateEntry {
                widget_id: widget_id.to_string(),
                closed,
            }),
        }
    }

    /// Sets `key` in the arg block, creating the block if needed.
    ///
    /// Returns false, leaving the entry untouched, if `key` cannot be stored
    /// as an attribute name (see [`WidgetEntry::is_valid_argument_key`]).
    pub fn set_argument(&mut self, key: &str, value: &str) -> bool {
        if !Self::is_valid_argument_key(key) {
            return false;
        }
        self.arguments
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.to_string());
        true
    }

    /// Argument keys are persisted as XML attribute names, so they must be
    /// XML names: a letter, `_` or `:` followed by letters, digits, `-`, `.`,
    /// `_` or `:`.
    pub fn is_valid_argument_key(key: &str) -> bool {
        let mut chars = key.chars();
        match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' || c == ':' => {}
            _ => return false,
        }
        chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'))
    }

    pub fn location(&self, widget_id: &str) -> Option<&LocationEntry> {
        self.locations.iter().find(|l| l.widget_id == widget_id)
    }

    pub fn state(&self, widget_id: &str) -> Option<&StateEntry> {
        self.states.iter().find(|s| s.widget_id == widget_id)
    }

    /// Widget ids whose recorded state is closed.
    pub fn closed_widget_ids(&self) -> impl Iterator<Item = &str> {
        self.states
            .iter()
            .filter(|s| s.closed)
            .map(|s| s.widget_id.as_str())
    }
}

/// In-memory session tree.
///
/// Top-level entries are only ever appended; a closed widget stays in the
/// document as a `closed` state so restores can replay the removal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionDocument {
    entries: Vec<WidgetEntry>,
}

impl SessionDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<WidgetEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[WidgetEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a new entry carrying `rect`. Repeated calls for the same
    /// controller append further entries.
    pub fn append_controller_rect(&mut self, controller_name: &str, rect: Rect) {
        self.entries
            .push(WidgetEntry::with_geometry(controller_name, rect));
    }

    /// Appends `entry` unchanged.
    pub fn append_entry(&mut self, entry: WidgetEntry) {
        self.entries.push(entry);
    }

    pub fn first_entry(&self, controller_name: &str) -> Option<&WidgetEntry> {
        self.entries
            .iter()
            .find(|e| e.controller_name == controller_name)
    }

    pub fn first_entry_mut(&mut self, controller_name: &str) -> Option<&mut WidgetEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.controller_name == controller_name)
    }

    pub fn contains_controller(&self, controller_name: &str) -> bool {
        self.first_entry(controller_name).is_some()
    }

    /// Upserts a location in the first entry for `controller_name`.
    ///
    /// Returns false when no entry exists for the controller.
    pub fn set_widget_location(
        &mut self,
        controller_name: &str,
        position: Point,
        widget_id: &str,
    ) -> bool {
        match self.first_entry_mut(controller_name) {
            Some(entry) => {
                entry.upsert_location(widget_id, position);
                true
            }
            None => false,
        }
    }

    /// Upserts a state in the first entry for `controller_name`.
    ///
    /// Returns false when no entry exists for the controller.
    pub fn set_widget_state(&mut self, controller_name: &str, widget_id: &str, closed: bool) -> bool {
        match self.first_entry_mut(controller_name) {
            Some(entry) => {
                entry.upsert_state(widget_id, closed);
                true
            }
            None => false,
        }
    }

    /// Sets `key` in the arg block of every entry for `controller_name`.
    ///
    /// Returns the number of entries touched.
    pub fn set_argument(&mut self, controller_name: &str, key: &str, value: &str) -> usize {
        let mut touched = 0;
        for entry in self
            .entries
            .iter_mut()
            .filter(|e| e.controller_name == controller_name)
        {
            if entry.set_argument(key, value) {
                touched += 1;
            }
        }
        touched
    }
}
