//! Error taxonomy
//!
//! [`HostError`] is what the GitHub collaborator hands back: a bare
//! classification of the remote failure. [`SyncError`] is what the user sees,
//! one line naming the operation and the identifier it was working on.

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a [`GitHubHost`](crate::host::GitHubHost) call.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("credentials rejected: {0}")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Errors surfaced to the user by the orchestrator and startup code.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication failed while {operation} {target}")]
    Auth { operation: String, target: String },

    #[error("{operation} {target} failed: {message}")]
    Transport {
        operation: String,
        target: String,
        message: String,
    },

    #[error("{0} doesn't match an available organization login string")]
    NotFound(String),

    #[error("{team} already exists as a team within the {organization} organization")]
    Conflict { organization: String, team: String },

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl SyncError {
    /// Attach the operation and identifier to a raw host failure.
    ///
    /// Only `Auth` gets its own variant. A `NotFound` or `Conflict` the
    /// caller did not handle itself is unexpected here and is reported with
    /// its operation like any other transport failure.
    pub fn from_host(err: HostError, operation: &str, target: &str) -> Self {
        match err {
            HostError::Auth(_) => SyncError::Auth {
                operation: operation.to_string(),
                target: target.to_string(),
            },
            other => SyncError::Transport {
                operation: operation.to_string(),
                target: target.to_string(),
                message: other.to_string(),
            },
        }
    }
}
