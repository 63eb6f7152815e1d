//! Session lifecycle notifications.

use tokio::sync::watch;

/// Coarse session phase, for top-level observers.
///
/// The client never navigates. It publishes state changes here and the
/// embedding shell decides what a login, logout, or forced logout looks
/// like on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session: the initial state, or after a deliberate logout.
    #[default]
    Anonymous,
    /// A session is active.
    Authenticated,
    /// The session was lost and could not be refreshed.
    Expired,
}

impl SessionState {
    /// Whether a session is currently usable.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated)
    }
}

/// Publisher for session state changes.
///
/// Built on a watch channel: observers always see the latest state, and
/// subscribing late still delivers the current one.
#[derive(Debug)]
pub struct SessionEvents {
    tx: watch::Sender<SessionState>,
}

impl SessionEvents {
    /// Creates a publisher starting in [`SessionState::Anonymous`].
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        Self { tx }
    }

    /// Subscribes to state changes. The receiver sees the current state
    /// immediately.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Publishes a new state, replacing the previous one.
    pub fn publish(&self, state: SessionState) {
        self.tx.send_replace(state);
    }

    /// The most recently published state.
    #[must_use]
    pub fn current(&self) -> SessionState {
        *self.tx.borrow()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
