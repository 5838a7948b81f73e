//! Controller resolution.
//!
//! The desktop view never constructs controllers itself; it asks a
//! [`ControllerResolver`] for one by name. Loading plugins from disk is the
//! host's business. [`ControllerCatalog`] covers the in-process case where
//! controllers are compiled in and registered as factories.

use std::collections::BTreeMap;
use std::fmt;

use super::model::ControllerHandle;
use crate::error::{PlexyError, Result};

/// Resolves controller names to fresh controller instances.
pub trait ControllerResolver {
    /// Instantiates the controller registered under `name`.
    ///
    /// # Returns
    ///
    /// - `Ok(handle)`: A new controller instance
    /// - `Err(PlexyError::ControllerUnavailable)`: No such plugin, or it failed to load
    fn resolve(&self, name: &str) -> Result<ControllerHandle>;
}

type ControllerFactory = Box<dyn Fn() -> Result<ControllerHandle>>;

/// Name-to-factory table of compiled-in controllers.
#[derive(Default)]
pub struct ControllerCatalog {
    factories: BTreeMap<String, ControllerFactory>,
}

impl ControllerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any previous factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<ControllerHandle> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<ControllerHandle> + 'static,
    {
        self.register(name, factory);
        self
    }
}

impl ControllerResolver for ControllerCatalog {
    fn resolve(&self, name: &str) -> Result<ControllerHandle> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| PlexyError::controller_unavailable(name, "no plugin registered"))?;
        factory()
    }
}

impl fmt::Debug for ControllerCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerCatalog")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
