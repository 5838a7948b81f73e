//! Session store trait.
//!
//! Defines the persistence collaborator the desktop view hands serialized
//! sessions to.

use crate::error::Result;

/// Raw storage for the serialized session document.
///
/// Implementations only move text in and out of storage; parsing and
/// reconciliation stay in the desktop view.
pub trait SessionStore {
    /// Loads the last saved session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(xml))`: A session was stored
    /// - `Ok(None)`: Nothing stored yet (first run)
    /// - `Err(_)`: Storage could not be read
    fn load(&self) -> Result<Option<String>>;

    /// Replaces the stored session with `xml`.
    fn save(&self, xml: &str) -> Result<()>;

    /// Removes the stored session.
    fn clear(&self) -> Result<()>;
}
