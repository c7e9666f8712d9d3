use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::SyncError;
use crate::filter::{anchor_exact_all, OrgFilter, OrgPattern};

/// Main configuration structure, as stored on disk
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// GitHub host, credentials and organization filters
    #[serde(default)]
    pub github: GitHubConfig,

    /// Remote call behavior
    #[serde(default)]
    pub sync: SyncSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GitHubConfig {
    /// API base URL; null means the public api.github.com
    pub host: Option<String>,

    /// Access token (falls back to GITHUB_TOKEN when unset)
    pub token: Option<String>,

    /// Organization filter strings
    #[serde(default)]
    pub organizations: Vec<String>,

    /// How `organizations` entries are interpreted
    #[serde(default)]
    pub org_match: OrgMatch,
}

/// Interpretation of configured organization filter strings
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrgMatch {
    /// Regular expressions searched anywhere in the display name
    #[default]
    Regex,
    /// Literal display names that must match in full
    Exact,
}

/// Remote call configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncSettings {
    /// Timeout for each remote call in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

fn default_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_values()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("github-sync").join("config.yml"))
    }

    /// Expand environment variables in host and token.
    ///
    /// A token referring to an unset variable is dropped so the GITHUB_TOKEN
    /// fallback still applies.
    pub fn expand_values(&mut self) -> Result<()> {
        if let Some(host) = &self.github.host {
            self.github.host = Some(
                shellexpand::full(host)
                    .context("Failed to expand github.host")?
                    .into_owned(),
            );
        }

        if let Some(token) = &self.github.token {
            self.github.token = match shellexpand::full(token) {
                Ok(expanded) => Some(expanded.into_owned()),
                Err(e) => {
                    debug!("Ignoring github.token: {}", e);
                    None
                }
            };
        }

        Ok(())
    }

    /// Compile the organization filter according to `org_match`
    pub fn org_filter(&self) -> Result<OrgFilter, SyncError> {
        let organizations = &self.github.organizations;

        let patterns = match self.github.org_match {
            OrgMatch::Regex => organizations
                .iter()
                .map(|raw| {
                    OrgPattern::new(raw).map_err(|e| {
                        SyncError::Config(format!("invalid organization pattern '{}': {}", raw, e))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            OrgMatch::Exact => anchor_exact_all(organizations.as_slice()).map_err(|e| {
                SyncError::Config(format!("invalid organization name: {}", e))
            })?,
        };

        if patterns.is_empty() {
            warn!("No organization filters configured, every organization will be skipped");
        }

        Ok(OrgFilter::new(patterns))
    }
}

/// Values supplied on the command line that take part in [`SyncConfig`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub token: Option<String>,
    pub dry_run: bool,
}

/// Immutable per-run configuration handed to the orchestrator
#[derive(Clone)]
pub struct SyncConfig {
    /// API base URL, `None` for the public host
    pub host: Option<String>,
    pub token: String,
    pub filter: OrgFilter,
    pub dry_run: bool,
    /// Bound on every remote call
    pub timeout: Duration,
}

impl SyncConfig {
    /// Materialize the run configuration.
    ///
    /// Fails before any network activity when no token can be found or a
    /// filter pattern does not compile.
    pub fn from_config(config: &Config, options: RunOptions) -> Result<Self, SyncError> {
        let token = resolve_token(
            options.token,
            config.github.token.clone(),
            std::env::var("GITHUB_TOKEN").ok(),
        )?;

        let host = config
            .github
            .host
            .clone()
            .filter(|host| !host.trim().is_empty());

        Ok(Self {
            host,
            token,
            filter: config.org_filter()?,
            dry_run: options.dry_run,
            timeout: Duration::from_secs(config.sync.timeout),
        })
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .field("filter", &self.filter)
            .field("dry_run", &self.dry_run)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Pick the first non-empty token: command line, config file, environment
fn resolve_token(
    cli: Option<String>,
    configured: Option<String>,
    env: Option<String>,
) -> Result<String, SyncError> {
    let token = [cli, configured, env]
        .into_iter()
        .flatten()
        .map(|token| token.trim().to_string())
        .find(|token| !token.is_empty())
        .ok_or_else(|| {
            SyncError::Config(
                "no token provided for GitHub client (set github.token, GITHUB_TOKEN or --token)"
                    .to_string(),
            )
        })?;

    if !["ghp_", "gho_", "ghs_", "github_pat_"]
        .iter()
        .any(|prefix| token.starts_with(prefix))
    {
        warn!("GitHub token doesn't look like a GitHub token (expected ghp_, gho_, ghs_ or github_pat_ prefix)");
    }

    Ok(token)
}
