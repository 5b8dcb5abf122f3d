//! Coordinator error taxonomy.

use std::fmt;
use std::string::String;

use crate::handoff::Slot;
use crate::protocol::ProtocolError;

/// Why a session stopped arbitrating turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A seated player broke the turn sequence.
    ProtocolViolation,
    /// A hand-off wait exceeded the configured bound.
    Timeout,
    /// A seated player left an active game.
    PlayerLeft,
    /// The session was cleared after the last logout.
    Reset,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::ProtocolViolation => write!(f, "protocol violation"),
            HaltReason::Timeout => write!(f, "peer timed out"),
            HaltReason::PlayerLeft => write!(f, "opponent left the game"),
            HaltReason::Reset => write!(f, "session was reset"),
        }
    }
}

/// Errors raised while handling a request.
///
/// `ProtocolViolation` and `Timeout` are fatal for the session: the
/// coordinator halts it and every parked request is answered with an error.
/// All other kinds are answered and leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// Both seats are taken.
    SessionFull,
    /// Game request from a connection that holds no seat.
    NotLoggedIn,
    Malformed(ProtocolError),
    /// The game already ended with `SunkAndWon`.
    GameOver,
    /// The session was halted while, or before, the request waited.
    Halted(HaltReason),
    /// Message out of the expected turn sequence.
    ProtocolViolation(String),
    /// A hand-off wait on this slot timed out.
    Timeout(Slot),
}

impl CoordinatorError {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CoordinatorError::ProtocolViolation(_) | CoordinatorError::Timeout(_)
        )
    }

    /// Reason to halt the session with, for fatal errors.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self {
            CoordinatorError::ProtocolViolation(_) => Some(HaltReason::ProtocolViolation),
            CoordinatorError::Timeout(_) => Some(HaltReason::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinatorError::SessionFull => write!(f, "too many players"),
            CoordinatorError::NotLoggedIn => write!(f, "not logged in"),
            CoordinatorError::Malformed(e) => write!(f, "malformed request: {}", e),
            CoordinatorError::GameOver => write!(f, "game is over"),
            CoordinatorError::Halted(reason) => write!(f, "session halted: {}", reason),
            CoordinatorError::ProtocolViolation(detail) => {
                write!(f, "protocol violation: {}", detail)
            }
            CoordinatorError::Timeout(slot) => write!(f, "timed out waiting on {}", slot),
        }
    }
}

impl std::error::Error for CoordinatorError {}

impl From<ProtocolError> for CoordinatorError {
    fn from(err: ProtocolError) -> Self {
        CoordinatorError::Malformed(err)
    }
}
