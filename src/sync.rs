//! Sync orchestration
//!
//! Drives the two operations of a run: scanning in-scope organizations for
//! open issues, and creating a team behind the dry-run gate. Work is strictly
//! sequential and reported line by line in the order the host yields it.

use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::error::{HostError, SyncError};
use crate::gate::{ActionGate, ActionResult};
use crate::host::{GitHubHost, OrganizationRef, RepositoryRef, TeamPrivacy};

/// Counts from a completed scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub organizations_matched: usize,
    pub organizations_skipped: usize,
    pub repositories: usize,
    pub issues: usize,
    pub duration: Duration,
}

/// Runs scan and team-creation operations against a [`GitHubHost`]
pub struct SyncOrchestrator<'a, H: GitHubHost + ?Sized, W: Write> {
    host: &'a H,
    config: &'a SyncConfig,
    gate: ActionGate,
    out: W,
}

impl<'a, H: GitHubHost + ?Sized, W: Write> SyncOrchestrator<'a, H, W> {
    pub fn new(host: &'a H, config: &'a SyncConfig, out: W) -> Self {
        Self {
            host,
            config,
            gate: ActionGate::new(config.dry_run),
            out,
        }
    }

    /// Consume the orchestrator, returning the report sink
    pub fn into_output(self) -> W {
        self.out
    }

    /// Walk every organization of the current user, reporting the open
    /// issues of each repository in the organizations the filter accepts.
    ///
    /// Filter mismatches are reported and skipped. Any failure to list
    /// organizations, repositories or issues ends the scan.
    pub async fn scan(&mut self) -> Result<ScanSummary, SyncError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        info!("Starting organization scan");

        let organizations = self
            .host
            .list_current_user_organizations()
            .await
            .map_err(|e| SyncError::from_host(e, "listing organizations for", "current user"))?;

        for org in &organizations {
            let display_name = org.display_name();

            if !self.config.filter.matches(display_name) {
                writeln!(
                    self.out,
                    "{} doesn't match given organization filters, skipping",
                    display_name
                )?;
                summary.organizations_skipped += 1;
                continue;
            }

            summary.organizations_matched += 1;
            self.scan_organization(org, &mut summary).await?;
        }

        summary.duration = start_time.elapsed();

        info!(
            "Scan completed in {:.2}s: {} organizations matched, {} skipped, {} repositories, {} issues",
            summary.duration.as_secs_f64(),
            summary.organizations_matched,
            summary.organizations_skipped,
            summary.repositories,
            summary.issues
        );

        Ok(summary)
    }

    async fn scan_organization(
        &mut self,
        org: &OrganizationRef,
        summary: &mut ScanSummary,
    ) -> Result<(), SyncError> {
        let display_name = org.display_name();
        debug!("Scanning organization: {} ({})", display_name, org.login);

        let repositories = self
            .host
            .list_repositories(org)
            .await
            .map_err(|e| SyncError::from_host(e, "listing repositories for", &org.login))?;

        for repo in &repositories {
            writeln!(self.out, "Working with {}:{}", display_name, repo.name)?;
            summary.repositories += 1;
            summary.issues += self.report_issues(repo).await?;
        }

        Ok(())
    }

    async fn report_issues(&mut self, repo: &RepositoryRef) -> Result<usize, SyncError> {
        let issues = self
            .host
            .list_issues(repo)
            .await
            .map_err(|e| SyncError::from_host(e, "listing issues for", &repo.full_name()))?;

        for issue in &issues {
            writeln!(self.out, "\t{} #{}", issue.title, issue.number)?;
        }

        Ok(issues.len())
    }

    /// Create a closed team named `team_name` in the organization `org_login`.
    ///
    /// An unknown organization yields [`ActionResult::NotFound`] without
    /// attempting the creation; a taken team name yields
    /// [`ActionResult::Conflict`]. Transport failures are returned as errors.
    pub async fn create_team(
        &mut self,
        org_login: &str,
        team_name: &str,
    ) -> Result<ActionResult, SyncError> {
        let org = match self.host.resolve_organization(org_login).await {
            Ok(org) => org,
            Err(HostError::NotFound(_)) => {
                writeln!(
                    self.out,
                    "ERROR: {}",
                    SyncError::NotFound(org_login.to_string())
                )?;
                return Ok(ActionResult::NotFound);
            }
            Err(e) => return Err(SyncError::from_host(e, "resolving organization", org_login)),
        };

        writeln!(
            self.out,
            "Target org of {} found! Creating team with name {}",
            org.login, team_name
        )?;

        let host = self.host;
        let operation = format!("creating team {} in", team_name);
        let result = self
            .gate
            .perform(&mut self.out, &operation, &org.login, || {
                host.create_team(&org, team_name, TeamPrivacy::Closed)
            })
            .await?;

        match result {
            ActionResult::Applied => {
                writeln!(self.out, "Created team {} in {}", team_name, org.login)?;
            }
            ActionResult::SkippedDryRun => {
                writeln!(
                    self.out,
                    "Dry run enabled, team {} was not created in {}",
                    team_name, org.login
                )?;
            }
            ActionResult::NotFound => {
                writeln!(self.out, "ERROR: {}", SyncError::NotFound(org.login.clone()))?;
            }
            ActionResult::Conflict => {
                let err = SyncError::Conflict {
                    organization: org.login.clone(),
                    team: team_name.to_string(),
                };
                writeln!(self.out, "ERROR: {}", err)?;
            }
        }

        Ok(result)
    }
}
