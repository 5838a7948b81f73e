use std::collections::BTreeMap;
use std::fmt;

use super::model::ControllerHandle;

/// Canonical map from controller name to its live instance.
///
/// Holds exactly one handle per name; inserting under an existing name
/// replaces the old handle.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: BTreeMap<String, ControllerHandle>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `controller` under `name`, returning the handle it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        controller: ControllerHandle,
    ) -> Option<ControllerHandle> {
        self.controllers.insert(name.into(), controller)
    }

    /// Looks up a handle. Never constructs.
    pub fn get(&self, name: &str) -> Option<ControllerHandle> {
        self.controllers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    /// Registered names, sorted, excluding `hidden`.
    pub fn names_except(&self, hidden: Option<&str>) -> Vec<String> {
        self.controllers
            .keys()
            .filter(|name| Some(name.as_str()) != hidden)
            .cloned()
            .collect()
    }
}

impl fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("names", &self.names_except(None))
            .finish()
    }
}
