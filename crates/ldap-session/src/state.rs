//! Session connection state.
//!
//! ## State Transitions
//!
//! ```text
//! Disconnected -> Connected (via connect(), after a successful bind)
//! Connected -> Connected (via connect(), previous handle unbound first)
//! Connected -> Disconnected (via close(), whether or not the unbind succeeds)
//! ```
//!
//! A transport handle exists only in the `Connected` state, so "connected"
//! and "holds a valid handle" cannot disagree.

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No bound connection.
    Disconnected,
    /// Bound and ready for directory operations.
    Connected,
}

impl SessionState {
    /// Check if directory operations are allowed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
        })
    }
}

/// Internal state holding the transport handle.
#[derive(Debug)]
pub(crate) enum ConnectionState<T> {
    Disconnected,
    Connected(T),
}

impl<T> ConnectionState<T> {
    pub(crate) fn public(&self) -> SessionState {
        match self {
            Self::Disconnected => SessionState::Disconnected,
            Self::Connected(_) => SessionState::Connected,
        }
    }

    pub(crate) fn handle_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Connected(handle) => Some(handle),
            Self::Disconnected => None,
        }
    }

    /// Move the handle out, leaving the state disconnected.
    pub(crate) fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::Disconnected) {
            Self::Connected(handle) => Some(handle),
            Self::Disconnected => None,
        }
    }
}
