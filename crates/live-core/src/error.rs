//! Error taxonomy for the live-session subsystem.
//!
//! Every variant is surfaced to the operator as a single human-readable
//! message and leaves the phase machine in the last successfully-reached
//! state. Nothing here is retried automatically.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveError {
    /// Camera or microphone permission refused, or device unavailable.
    /// Recoverable: the operator may retry the capture.
    #[error("{0}")]
    PermissionDenied(String),

    /// Token endpoint unreachable or it rejected the request.
    #[error("{0}")]
    CredentialError(String),

    /// Transport rejected a join or publish. After a failed publish the
    /// channel must be left before retrying to avoid a duplicate publish.
    #[error("{0}")]
    TransportError(String),

    /// Session-store write failed; local and remote state may diverge until
    /// the next snapshot. Surfaced to the caller rather than swallowed.
    #[error("{0}")]
    PersistenceError(String),

    /// A bounded network step did not complete within its deadline.
    #[error("timed out waiting for {operation}")]
    Timeout { operation: &'static str },

    /// Another mutating command is still pending; single-flight is enforced
    /// here rather than by UI disablement.
    #[error("another command is still in flight")]
    CommandInFlight,

    /// The command is not legal in the current phase, or its target entry is
    /// not in a state that permits it.
    #[error("{0}")]
    InvalidCommand(String),
}

impl LiveError {
    /// Whether the operator can retry the triggering action without any
    /// repair beyond what the failing command already performed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LiveError::InvalidCommand(_))
    }
}
