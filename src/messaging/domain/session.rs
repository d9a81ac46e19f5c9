//! Session lifecycle state machine shared by producers and consumers.

use super::SessionStateError;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle state of an adapter's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No session has been opened yet.
    Uninitialized,
    /// Session is open and idle.
    Connected,
    /// A send is in flight.
    Sending,
    /// A consume call is in flight.
    Receiving,
    /// A commit is in flight.
    Committing,
    /// Session was closed. Terminal.
    Closed,
}

impl SessionState {
    /// Returns the canonical name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Connected => "connected",
            Self::Sending => "sending",
            Self::Receiving => "receiving",
            Self::Committing => "committing",
            Self::Closed => "closed",
        }
    }

    /// Returns whether an operation is in flight.
    #[must_use]
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::Sending | Self::Receiving | Self::Committing)
    }

    /// Returns whether transition to `target` is allowed.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Uninitialized, Self::Connected | Self::Closed)
                | (
                    Self::Connected,
                    Self::Sending | Self::Receiving | Self::Committing | Self::Closed
                )
                | (
                    Self::Sending | Self::Receiving | Self::Committing,
                    Self::Connected | Self::Closed
                )
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Tracks the lifecycle of one session.
///
/// The state lives behind a mutex that is only held for the duration of a
/// transition, never across client calls, so `close` can run while a
/// receive is blocked.
#[derive(Debug)]
pub struct SessionLifecycle {
    state: Mutex<SessionState>,
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLifecycle {
    /// Creates a lifecycle in the `uninitialized` state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::Uninitialized),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.lock()
    }

    /// Records that the session was opened.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStateError::InvalidTransition`] unless the lifecycle
    /// is still `uninitialized`.
    pub fn mark_connected(&self) -> Result<(), SessionStateError> {
        let mut state = self.lock();
        transition(&mut state, SessionState::Connected)
    }

    /// Starts an operation, returning a guard that returns the session to
    /// `connected` when dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStateError::Closed`] after close,
    /// [`SessionStateError::Busy`] while another operation is in flight, and
    /// [`SessionStateError::InvalidTransition`] before the session is open.
    pub fn begin(&self, operation: SessionState) -> Result<OperationGuard<'_>, SessionStateError> {
        let mut state = self.lock();
        match *state {
            SessionState::Closed => return Err(SessionStateError::Closed),
            current if current.is_busy() => {
                return Err(SessionStateError::Busy(current.as_str().to_owned()));
            }
            _ => {}
        }
        transition(&mut state, operation)?;
        Ok(OperationGuard {
            lifecycle: self,
            operation,
        })
    }

    /// Moves the session to `closed`.
    ///
    /// Returns `true` when this call performed the transition and `false`
    /// when the session was already closed.
    pub fn close(&self) -> bool {
        let mut state = self.lock();
        if *state == SessionState::Closed {
            return false;
        }
        *state = SessionState::Closed;
        true
    }
}

fn transition(state: &mut SessionState, target: SessionState) -> Result<(), SessionStateError> {
    if !state.can_transition_to(target) {
        return Err(SessionStateError::InvalidTransition {
            from: state.as_str().to_owned(),
            to: target.as_str().to_owned(),
        });
    }
    *state = target;
    Ok(())
}

/// Marks an in-flight operation; dropping it ends the operation.
///
/// If the session was closed while the operation ran, the state stays
/// `closed`.
#[derive(Debug)]
pub struct OperationGuard<'lifecycle> {
    lifecycle: &'lifecycle SessionLifecycle,
    operation: SessionState,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.lifecycle.lock();
        if *state == self.operation {
            *state = SessionState::Connected;
        }
    }
}
