use async_trait::async_trait;
use octocrab::params::{self, teams::Privacy};
use octocrab::{Octocrab, Page};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::HostError;
use crate::host::{GitHubHost, IssueRef, OrganizationRef, RepositoryRef, TeamPrivacy};

const PER_PAGE: u8 = 100;

// GitHub API pagination limit for u8
const MAX_PAGES: u8 = 255;

/// GitHub client backed by octocrab
pub struct OctocrabHost {
    client: Octocrab,
    username: String,
    timeout: Duration,
}

impl OctocrabHost {
    /// Build a client for the configured host and verify the token.
    ///
    /// An absent host means the public api.github.com.
    pub async fn authenticate(config: &SyncConfig) -> Result<Self, HostError> {
        let mut builder = Octocrab::builder().personal_token(config.token.clone());

        if let Some(host) = &config.host {
            debug!("Using GitHub host: {}", host);
            builder = builder
                .base_uri(host.as_str())
                .map_err(|e| HostError::Transport(format!("invalid host URL {}: {}", host, e)))?;
        }

        let client = builder
            .build()
            .map_err(|e| HostError::Transport(format!("failed to create GitHub client: {}", e)))?;

        let mut host = Self {
            client,
            username: String::new(),
            timeout: config.timeout,
        };

        let user = host.call(host.client.current().user()).await?;
        info!("Authenticated as GitHub user: {}", user.login);
        host.username = user.login;

        Ok(host)
    }

    /// Get the authenticated username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Await a request, bounded by the configured timeout
    async fn call<T, F>(&self, request: F) -> Result<T, HostError>
    where
        F: Future<Output = octocrab::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result.map_err(classify),
            Err(_) => Err(HostError::Timeout(self.timeout)),
        }
    }

    /// Fetch pages from 1 upwards until one comes back empty
    async fn collect_pages<T, F, Fut>(&self, what: &str, mut fetch: F) -> Result<Vec<T>, HostError>
    where
        F: FnMut(u8) -> Fut,
        Fut: Future<Output = octocrab::Result<Page<T>>>,
    {
        let mut items = Vec::new();
        let mut page = 1u8;

        loop {
            let page_items = self.call(fetch(page)).await?.items;
            if page_items.is_empty() {
                break;
            }

            items.extend(page_items);

            if page >= MAX_PAGES {
                warn!("Reached maximum pagination limit ({} pages) for {}", MAX_PAGES, what);
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl GitHubHost for OctocrabHost {
    async fn list_current_user_organizations(&self) -> Result<Vec<OrganizationRef>, HostError> {
        debug!("Fetching organizations for user: {}", self.username);

        let client = &self.client;
        let memberships = self
            .collect_pages("organization memberships", move |page| async move {
                client
                    .current()
                    .list_org_memberships_for_authenticated_user()
                    .per_page(PER_PAGE)
                    .page(page)
                    .send()
                    .await
            })
            .await?;

        // Memberships carry no display name, so each active one is looked up
        let mut organizations = Vec::with_capacity(memberships.len());
        for membership in memberships {
            if membership.state != "active" {
                debug!(
                    "Ignoring {} membership in {}",
                    membership.state, membership.organization.login
                );
                continue;
            }
            organizations.push(self.resolve_organization(&membership.organization.login).await?);
        }

        info!("Found {} organizations", organizations.len());
        Ok(organizations)
    }

    async fn list_repositories(&self, org: &OrganizationRef) -> Result<Vec<RepositoryRef>, HostError> {
        debug!("Fetching repositories for organization: {}", org.login);

        let client = &self.client;
        let login = org.login.as_str();
        let repos = self
            .collect_pages(login, move |page| async move {
                client
                    .orgs(login)
                    .list_repos()
                    .per_page(PER_PAGE)
                    .page(page)
                    .send()
                    .await
            })
            .await?;

        Ok(repos
            .into_iter()
            .map(|repo| RepositoryRef::new(org.login.clone(), repo.name))
            .collect())
    }

    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<IssueRef>, HostError> {
        let full_name = repo.full_name();
        debug!("Fetching open issues for repository: {}", full_name);

        let client = &self.client;
        let (owner, name) = (repo.owner.as_str(), repo.name.as_str());
        let issues = self
            .collect_pages(&full_name, move |page| async move {
                client
                    .issues(owner, name)
                    .list()
                    .state(params::State::Open)
                    .per_page(PER_PAGE)
                    .page(page)
                    .send()
                    .await
            })
            .await?;

        // The issues endpoint also lists pull requests
        Ok(issues
            .into_iter()
            .filter(|issue| issue.pull_request.is_none())
            .map(|issue| IssueRef {
                number: issue.number,
                title: issue.title,
            })
            .collect())
    }

    async fn resolve_organization(&self, login: &str) -> Result<OrganizationRef, HostError> {
        let org = self.call(self.client.orgs(login).get()).await?;

        Ok(OrganizationRef::new(org.login, org.name))
    }

    async fn create_team(
        &self,
        org: &OrganizationRef,
        name: &str,
        privacy: TeamPrivacy,
    ) -> Result<(), HostError> {
        let team = self
            .call(
                self.client
                    .teams(org.login.as_str())
                    .create(name)
                    .privacy(privacy_param(privacy))
                    .send(),
            )
            .await?;

        info!("Created team {} ({}) in {}", team.name, team.slug, org.login);
        Ok(())
    }
}

fn privacy_param(privacy: TeamPrivacy) -> Privacy {
    match privacy {
        TeamPrivacy::Closed => Privacy::Closed,
        TeamPrivacy::Secret => Privacy::Secret,
    }
}

/// Map an octocrab failure onto the host error taxonomy
fn classify(error: octocrab::Error) -> HostError {
    match error {
        octocrab::Error::GitHub { source, .. } => {
            classify_status(source.status_code.as_u16(), source.message.clone())
        }
        other => HostError::Transport(other.to_string()),
    }
}

fn classify_status(status: u16, message: String) -> HostError {
    match status {
        // Exhausted quotas also answer 403, and they say nothing about the token
        403 | 429 if is_rate_limited(&message) => {
            HostError::Transport(format!("HTTP {}: {}", status, message))
        }
        401 | 403 => HostError::Auth(message),
        404 => HostError::NotFound(message),
        422 => HostError::Conflict(message),
        _ => HostError::Transport(format!("HTTP {}: {}", status, message)),
    }
}

fn is_rate_limited(message: &str) -> bool {
    message.to_ascii_lowercase().contains("rate limit")
}
