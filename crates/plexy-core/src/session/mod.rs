//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: The session document (`SessionDocument`, `WidgetEntry`, ...)
//! - `codec`: XML serialization and lenient parsing
//! - `event`: "Session updated" notification fan-out
//! - `repository`: Persistence collaborator trait (`SessionStore`)

mod codec;
mod event;
mod model;
mod repository;

pub use codec::ParsedSession;
pub use event::{SessionListener, SessionNotifier};
pub use model::{CONTROLLER_WIDGET_ID, LocationEntry, SessionDocument, StateEntry, WidgetEntry};
pub use repository::SessionStore;
