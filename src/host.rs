//! GitHub host abstraction
//!
//! The orchestrator talks to the hosting service only through [`GitHubHost`],
//! so the transport (octocrab, a test fake) can be swapped freely.

use async_trait::async_trait;

use crate::error::HostError;

/// An organization on the remote host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationRef {
    /// Login identifier, used for API addressing
    pub login: String,

    /// Human-readable name, if the organization set one
    pub name: Option<String>,
}

impl OrganizationRef {
    pub fn new(login: impl Into<String>, name: Option<String>) -> Self {
        Self {
            login: login.into(),
            name,
        }
    }

    /// Preferred human name, falling back to the login when no name is set
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.login,
        }
    }
}

/// A repository belonging to one organization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    /// Login of the owning organization
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Get display name (owner/name format)
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// An open issue in one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub number: u64,
    pub title: String,
}

/// Team visibility policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamPrivacy {
    /// Visible to all organization members
    #[default]
    Closed,
    /// Visible only to team members and owners
    Secret,
}

impl TeamPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamPrivacy::Closed => "closed",
            TeamPrivacy::Secret => "secret",
        }
    }
}

/// Operations the sync core needs from a GitHub hosting service
///
/// Implementations return results in the order the service yields them and
/// own their pagination, retry and timeout policy.
#[async_trait]
pub trait GitHubHost: Send + Sync {
    /// Organizations the authenticated identity belongs to
    async fn list_current_user_organizations(&self) -> Result<Vec<OrganizationRef>, HostError>;

    async fn list_repositories(&self, org: &OrganizationRef) -> Result<Vec<RepositoryRef>, HostError>;

    /// Open issues of a repository
    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<IssueRef>, HostError>;

    /// Look up an organization by login, failing with [`HostError::NotFound`]
    async fn resolve_organization(&self, login: &str) -> Result<OrganizationRef, HostError>;

    /// Create a team, failing with [`HostError::Conflict`] when the name is taken
    async fn create_team(
        &self,
        org: &OrganizationRef,
        name: &str,
        privacy: TeamPrivacy,
    ) -> Result<(), HostError>;
}
