//! Common test utilities and helpers for github-sync tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use github_sync::{
    GitHubHost, HostError, IssueRef, OrgFilter, OrgPattern, OrganizationRef, RepositoryRef,
    SyncConfig, TeamPrivacy,
};

/// In-memory GitHub host that records every call it receives.
///
/// Calls are logged as `orgs`, `repos:<org>`, `issues:<owner>/<repo>`,
/// `resolve:<login>` and `create_team:<org>/<team>:<privacy>`. A failure
/// registered under the same key is returned instead of data.
#[derive(Default)]
pub struct FakeHost {
    organizations: Vec<OrganizationRef>,
    repositories: HashMap<String, Vec<RepositoryRef>>,
    issues: HashMap<String, Vec<IssueRef>>,
    teams: Vec<(String, String)>,
    failures: HashMap<String, fn() -> HostError>,
    calls: Mutex<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_org(mut self, login: &str, name: Option<&str>) -> Self {
        self.organizations
            .push(OrganizationRef::new(login, name.map(str::to_string)));
        self
    }

    pub fn with_repo(mut self, org: &str, name: &str) -> Self {
        self.repositories
            .entry(org.to_string())
            .or_default()
            .push(RepositoryRef::new(org, name));
        self
    }

    pub fn with_issue(mut self, owner: &str, repo: &str, number: u64, title: &str) -> Self {
        self.issues
            .entry(format!("{}/{}", owner, repo))
            .or_default()
            .push(IssueRef {
                number,
                title: title.to_string(),
            });
        self
    }

    pub fn with_team(mut self, org: &str, team: &str) -> Self {
        self.teams.push((org.to_string(), team.to_string()));
        self
    }

    pub fn failing(mut self, call: &str, error: fn() -> HostError) -> Self {
        self.failures.insert(call.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, call: &str) -> bool {
        self.calls().iter().any(|c| c == call)
    }

    pub fn create_team_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("create_team:"))
            .count()
    }

    fn record(&self, call: String) -> Result<(), HostError> {
        self.calls.lock().unwrap().push(call.clone());
        match self.failures.get(&call) {
            Some(error) => Err(error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GitHubHost for FakeHost {
    async fn list_current_user_organizations(&self) -> Result<Vec<OrganizationRef>, HostError> {
        self.record("orgs".to_string())?;
        Ok(self.organizations.clone())
    }

    async fn list_repositories(&self, org: &OrganizationRef) -> Result<Vec<RepositoryRef>, HostError> {
        self.record(format!("repos:{}", org.login))?;
        Ok(self.repositories.get(&org.login).cloned().unwrap_or_default())
    }

    async fn list_issues(&self, repo: &RepositoryRef) -> Result<Vec<IssueRef>, HostError> {
        self.record(format!("issues:{}", repo.full_name()))?;
        Ok(self.issues.get(&repo.full_name()).cloned().unwrap_or_default())
    }

    async fn resolve_organization(&self, login: &str) -> Result<OrganizationRef, HostError> {
        self.record(format!("resolve:{}", login))?;
        self.organizations
            .iter()
            .find(|org| org.login == login)
            .cloned()
            .ok_or_else(|| HostError::NotFound("Not Found".to_string()))
    }

    async fn create_team(
        &self,
        org: &OrganizationRef,
        name: &str,
        privacy: TeamPrivacy,
    ) -> Result<(), HostError> {
        self.record(format!("create_team:{}/{}:{}", org.login, name, privacy.as_str()))?;
        if self
            .teams
            .iter()
            .any(|(team_org, team)| team_org == &org.login && team == name)
        {
            return Err(HostError::Conflict("Validation Failed".to_string()));
        }
        Ok(())
    }
}

/// Run configuration with raw, unanchored patterns
pub fn sync_config(patterns: &[&str], dry_run: bool) -> SyncConfig {
    let patterns = patterns
        .iter()
        .map(|p| OrgPattern::new(p).expect("valid test pattern"))
        .collect();

    SyncConfig {
        host: None,
        token: "ghp_test".to_string(),
        filter: OrgFilter::new(patterns),
        dry_run,
        timeout: Duration::from_secs(5),
    }
}

/// Report output as a string
pub fn output(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).expect("report is UTF-8")
}

/// GitHub REST payloads shaped like the real API, for the mock server
pub mod fixtures {
    use serde_json::{json, Value};

    const API: &str = "https://api.github.com";

    pub fn user(login: &str) -> Value {
        json!({
            "login": login,
            "id": 1,
            "node_id": "MDQ6VXNlcjE=",
            "avatar_url": "https://avatars.githubusercontent.com/u/1?v=4",
            "gravatar_id": "",
            "url": format!("{API}/users/{login}"),
            "html_url": format!("https://github.com/{login}"),
            "followers_url": format!("{API}/users/{login}/followers"),
            "following_url": format!("{API}/users/{login}/following{{/other_user}}"),
            "gists_url": format!("{API}/users/{login}/gists{{/gist_id}}"),
            "starred_url": format!("{API}/users/{login}/starred{{/owner}}{{/repo}}"),
            "subscriptions_url": format!("{API}/users/{login}/subscriptions"),
            "organizations_url": format!("{API}/users/{login}/orgs"),
            "repos_url": format!("{API}/users/{login}/repos"),
            "events_url": format!("{API}/users/{login}/events{{/privacy}}"),
            "received_events_url": format!("{API}/users/{login}/received_events"),
            "type": "User",
            "site_admin": false
        })
    }

    pub fn organization(login: &str, name: Option<&str>) -> Value {
        json!({
            "login": login,
            "id": 2,
            "node_id": "MDEyOk9yZ2FuaXphdGlvbjI=",
            "url": format!("{API}/orgs/{login}"),
            "repos_url": format!("{API}/orgs/{login}/repos"),
            "events_url": format!("{API}/orgs/{login}/events"),
            "hooks_url": format!("{API}/orgs/{login}/hooks"),
            "issues_url": format!("{API}/orgs/{login}/issues"),
            "members_url": format!("{API}/orgs/{login}/members{{/member}}"),
            "public_members_url": format!("{API}/orgs/{login}/public_members{{/member}}"),
            "avatar_url": "https://avatars.githubusercontent.com/u/2?v=4",
            "description": null,
            "name": name
        })
    }

    pub fn membership(org: &str, state: &str, viewer: &str) -> Value {
        json!({
            "url": format!("{API}/orgs/{org}/memberships/{viewer}"),
            "state": state,
            "role": "member",
            "organization_url": format!("{API}/orgs/{org}"),
            "organization": organization(org, None),
            "user": user(viewer)
        })
    }

    pub fn repository(owner: &str, name: &str) -> Value {
        json!({
            "id": 3,
            "name": name,
            "full_name": format!("{owner}/{name}"),
            "url": format!("{API}/repos/{owner}/{name}")
        })
    }

    pub fn issue(owner: &str, repo: &str, number: u64, title: &str) -> Value {
        let base = format!("{API}/repos/{owner}/{repo}");
        json!({
            "id": number,
            "node_id": "MDU6SXNzdWUx",
            "url": format!("{base}/issues/{number}"),
            "repository_url": base,
            "labels_url": format!("{base}/issues/{number}/labels{{/name}}"),
            "comments_url": format!("{base}/issues/{number}/comments"),
            "events_url": format!("{base}/issues/{number}/events"),
            "html_url": format!("https://github.com/{owner}/{repo}/issues/{number}"),
            "number": number,
            "state": "open",
            "title": title,
            "user": user("reporter"),
            "labels": [],
            "assignees": [],
            "locked": false,
            "comments": 0,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z"
        })
    }

    pub fn pull_request(owner: &str, repo: &str, number: u64, title: &str) -> Value {
        let mut value = issue(owner, repo, number, title);
        let html = format!("https://github.com/{owner}/{repo}/pull/{number}");
        value["pull_request"] = json!({
            "url": format!("{API}/repos/{owner}/{repo}/pulls/{number}"),
            "html_url": html,
            "diff_url": format!("{html}.diff"),
            "patch_url": format!("{html}.patch")
        });
        value
    }

    pub fn team(org: &str, name: &str) -> Value {
        json!({
            "id": 4,
            "node_id": "MDQ6VGVhbTQ=",
            "url": format!("{API}/teams/4"),
            "html_url": format!("https://github.com/orgs/{org}/teams/{name}"),
            "name": name,
            "slug": name,
            "description": null,
            "privacy": "closed",
            "permission": "pull",
            "members_url": format!("{API}/teams/4/members{{/member}}"),
            "repositories_url": format!("{API}/teams/4/repos")
        })
    }

    pub fn error(message: &str) -> Value {
        json!({
            "message": message,
            "documentation_url": "https://docs.github.com/rest"
        })
    }
}
