//! Desktop startup wiring.
//!
//! Connects a [`DesktopView`] to its session store and brings up either the
//! saved session or the configured default controllers.

use std::rc::Rc;

use plexy_core::{ControllerResolver, DesktopConfig, DesktopView, Result, SessionStore};

/// Builds the desktop view for `config`.
///
/// The view is subscribed to `store` before anything is loaded, so every
/// change made during startup is persisted. The background controller is set
/// first; then the stored session is restored, or on first run each default
/// controller is added and recorded. Controllers that fail to load are logged
/// and skipped.
///
/// # Errors
///
/// Returns an error only if the stored session cannot be read.
pub fn start_desktop<S>(
    config: &DesktopConfig,
    resolver: impl ControllerResolver + 'static,
    store: Rc<S>,
) -> Result<DesktopView>
where
    S: SessionStore + 'static,
{
    let stored = store.load()?;

    let mut view = DesktopView::new(resolver, config.viewport());
    view.persist_to(store);

    if let Some(name) = &config.background_controller
        && let Err(e) = view.set_background_controller(name)
    {
        tracing::warn!("[Bootstrap] Starting without background '{}': {}", name, e);
    }

    match stored {
        Some(xml) => {
            tracing::info!("[Bootstrap] Restoring saved session");
            view.restore(&xml, false);
        }
        None => {
            tracing::info!(
                "[Bootstrap] No saved session, loading {} default controller(s)",
                config.default_controllers.len()
            );
            for name in &config.default_controllers {
                if let Err(e) = view.add_controller(name, false) {
                    tracing::warn!("[Bootstrap] Skipping default controller '{}': {}", name, e);
                }
            }
        }
    }

    Ok(view)
}
