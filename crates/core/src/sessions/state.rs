//! The session state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal states of a session for one `(enrollment, date)`.
///
/// There is no stored "none" state: a session row only exists once one of
/// these has been reached, and it never transitions to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// The session was given; obligations accrue.
    Given,
    /// The session was cancelled for the day; nothing accrues.
    Cancelled,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Given => write!(f, "given"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Outcome of a requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No row existed; the caller should create one in the requested state.
    Create,
    /// The row already holds the requested state; the retry is a no-op
    /// (the caller should still heal any missing side effects).
    AlreadyInState,
}

/// Attempted to cross between the two terminal states.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("session is already {current} for this enrollment and date, cannot mark it {requested}")]
pub struct StateConflict {
    /// State the session already holds.
    pub current: SessionState,
    /// State the caller asked for.
    pub requested: SessionState,
}

/// Decides what a requested transition means given the stored state.
///
/// Idempotent retries are the only case where "already done" is success;
/// crossing from `given` to `cancelled` or back is a conflict, never a
/// silent overwrite.
///
/// # Errors
///
/// Returns `StateConflict` when the stored state differs from the request.
pub fn transition(
    current: Option<SessionState>,
    requested: SessionState,
) -> Result<Transition, StateConflict> {
    match current {
        None => Ok(Transition::Create),
        Some(state) if state == requested => Ok(Transition::AlreadyInState),
        Some(state) => Err(StateConflict {
            current: state,
            requested,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_transition_creates() {
        assert_eq!(
            transition(None, SessionState::Given),
            Ok(Transition::Create)
        );
        assert_eq!(
            transition(None, SessionState::Cancelled),
            Ok(Transition::Create)
        );
    }

    #[test]
    fn test_retry_is_noop() {
        assert_eq!(
            transition(Some(SessionState::Given), SessionState::Given),
            Ok(Transition::AlreadyInState)
        );
        assert_eq!(
            transition(Some(SessionState::Cancelled), SessionState::Cancelled),
            Ok(Transition::AlreadyInState)
        );
    }

    #[test]
    fn test_cross_transitions_conflict() {
        assert_eq!(
            transition(Some(SessionState::Given), SessionState::Cancelled),
            Err(StateConflict {
                current: SessionState::Given,
                requested: SessionState::Cancelled,
            })
        );
        assert_eq!(
            transition(Some(SessionState::Cancelled), SessionState::Given),
            Err(StateConflict {
                current: SessionState::Cancelled,
                requested: SessionState::Given,
            })
        );
    }
}
