//! Controller domain module.
//!
//! # Module Structure
//!
//! - `model`: The `Controller` capability trait and the values passed to it
//! - `resolver`: Name-based controller resolution (`ControllerResolver`, `ControllerCatalog`)
//! - `registry`: Live controller instances by name (`ControllerRegistry`)

mod model;
mod registry;
mod resolver;

pub use model::{Controller, ControllerHandle, DropEvent, SessionArgs, Viewport};
pub use registry::ControllerRegistry;
pub use resolver::{ControllerCatalog, ControllerResolver};
