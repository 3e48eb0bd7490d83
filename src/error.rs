//! Error taxonomy for the session controller.

use crate::games::nim::ValidationError;
use derive_more::{Display, Error, From};
use tracing::instrument;

/// Transport failure talking to the remote engine.
///
/// Covers connection errors, timeouts, non-success HTTP statuses and
/// bodies that fail to decode.
#[derive(Debug, Clone, Display, Error)]
#[display("Network error: {} at {}:{}", message, file, line)]
pub struct NetworkError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl NetworkError {
    /// Creates a new network error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(format!("Request timed out: {}", err))
        } else {
            Self::new(format!("HTTP request failed: {}", err))
        }
    }
}

/// Everything a session action can fail with.
///
/// None of these are fatal: the session is always left in its last
/// committed state and the action may be retried.
#[derive(Debug, Clone, Display, Error, From)]
pub enum SessionError {
    /// Pre-flight rejection; nothing was sent.
    #[display("{}", _0)]
    #[from]
    Validation(ValidationError),

    /// Transport failure.
    #[display("{}", _0)]
    #[from]
    Network(NetworkError),

    /// The engine answered with a negative result.
    #[display("Rejected by engine: {}", _0)]
    RemoteRejection(#[error(not(source))] String),

    /// A fetched state contradicted itself.
    #[display("State out of sync: {}", _0)]
    StateDesync(#[error(not(source))] String),

    /// A newer request was issued before this one's response arrived.
    #[display("Response discarded: superseded by a newer request")]
    Superseded,

    /// Another mutating action is still waiting for the engine.
    #[display("Another action is still in progress")]
    Busy,

    /// A confirmation prompt is already open.
    #[display("A confirmation is already pending")]
    GateBusy,

    /// Restart was requested before the initial piles were known.
    #[display("No initial game state found to restart. Please start a new game.")]
    NothingToRestart,

    /// The action makes no sense in the current lifecycle phase.
    #[display("Cannot {} while in {} phase", action, phase)]
    InvalidTransition {
        /// The attempted action.
        action: &'static str,
        /// Phase the session was in.
        phase: crate::session::Phase,
    },
}

impl SessionError {
    /// Returns true for errors that never left the client.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::Busy
                | Self::GateBusy
                | Self::NothingToRestart
                | Self::InvalidTransition { .. }
        )
    }
}
