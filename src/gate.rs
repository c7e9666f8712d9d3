//! Dry-run gate for mutating operations
//!
//! Every remote mutation goes through [`ActionGate::perform`]. With dry-run
//! enabled the action is reported and never invoked.

use std::fmt;
use std::future::Future;
use std::io::Write;
use tracing::{debug, info};

use crate::error::{HostError, SyncError};

/// Outcome of a gated mutating operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResult {
    /// The action ran and the remote accepted it
    Applied,
    /// Dry run: the action was reported but not invoked
    SkippedDryRun,
    /// The remote target of the action does not exist
    NotFound,
    /// The entity the action would create already exists
    Conflict,
}

impl ActionResult {
    /// Applied and dry-run skips count as success
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Applied | ActionResult::SkippedDryRun)
    }

    /// Process exit status for a run that ended with this result
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActionResult::Applied => "applied",
            ActionResult::SkippedDryRun => "skipped (dry run)",
            ActionResult::NotFound => "not found",
            ActionResult::Conflict => "conflict",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActionGate {
    dry_run: bool,
}

impl ActionGate {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run `action` unless this is a dry run.
    ///
    /// `operation` and `target` read together as a phrase, e.g. "creating team
    /// committers in" + "acme", and are written to `out` before anything
    /// happens. Not-found and already-exists failures become
    /// [`ActionResult`]s; any other failure is returned with that context.
    pub async fn perform<W, F, Fut>(
        &self,
        out: &mut W,
        operation: &str,
        target: &str,
        action: F,
    ) -> Result<ActionResult, SyncError>
    where
        W: Write + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), HostError>>,
    {
        if self.dry_run {
            writeln!(out, "[dry run] skipped {} {}", operation, target)?;
            info!("Dry run, not invoking: {} {}", operation, target);
            return Ok(ActionResult::SkippedDryRun);
        }

        writeln!(out, "[live] {} {}", operation, target)?;
        debug!("Invoking gated action: {} {}", operation, target);

        match action().await {
            Ok(()) => Ok(ActionResult::Applied),
            Err(HostError::NotFound(message)) => {
                debug!("Gated action target not found: {}", message);
                Ok(ActionResult::NotFound)
            }
            Err(HostError::Conflict(message)) => {
                debug!("Gated action conflicted: {}", message);
                Ok(ActionResult::Conflict)
            }
            Err(e) => Err(SyncError::from_host(e, operation, target)),
        }
    }
}
