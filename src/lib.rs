//! github-sync - GitHub organization visibility and team management
//!
//! Enumerates the organizations visible to a GitHub token, keeps the ones
//! matching the configured filters, and reports the open issues of every
//! repository they own. It can also create a team inside an organization,
//! with every mutation gated behind a dry-run flag.
//!
//! ## Modules
//!
//! - [`config`]: Configuration file handling and the per-run [`SyncConfig`]
//! - [`filter`]: Organization filter patterns
//! - [`gate`]: Dry-run gate around mutating operations
//! - [`host`]: The [`GitHubHost`] abstraction and the values it returns
//! - [`github`]: octocrab-backed [`GitHubHost`]
//! - [`sync`]: Scan and team-creation orchestration

pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod github;
pub mod host;
pub mod sync;

pub use config::{Config, RunOptions, SyncConfig};
pub use error::{HostError, SyncError};
pub use filter::{anchor_exact, anchor_exact_all, OrgFilter, OrgPattern};
pub use gate::{ActionGate, ActionResult};
pub use github::OctocrabHost;
pub use host::{GitHubHost, IssueRef, OrganizationRef, RepositoryRef, TeamPrivacy};
pub use sync::{ScanSummary, SyncOrchestrator};
