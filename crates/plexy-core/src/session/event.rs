use std::fmt;

/// Callback invoked with the full serialized document after each mutation.
pub type SessionListener = Box<dyn FnMut(&str)>;

/// Synchronous fan-out of "session updated" notifications.
///
/// Listeners run in subscription order, on the caller's stack, before the
/// mutating call returns.
#[derive(Default)]
pub struct SessionNotifier {
    listeners: Vec<SessionListener>,
}

impl SessionNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn notify(&mut self, serialized: &str) {
        for listener in self.listeners.iter_mut() {
            listener(serialized);
        }
    }
}

impl fmt::Debug for SessionNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
