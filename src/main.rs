use anyhow::{bail, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use github_sync::{Config, OctocrabHost, RunOptions, SyncConfig, SyncError, SyncOrchestrator};

#[derive(Parser)]
#[command(name = "github-sync")]
#[command(about = "Report open issues across GitHub organizations and manage organization teams")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// GitHub access token (overrides config and GITHUB_TOKEN)
    #[arg(short = 'T', long)]
    token: Option<String>,

    /// Creates a team: the first argument is the target organization login, the second the new team name
    #[arg(
        short = 'C',
        long = "create_team",
        num_args = 2,
        value_names = ["ORG_LOGIN", "TEAM_NAME"]
    )]
    create_team: Option<Vec<String>>,

    /// Enables dry run, disabling writing functionality
    #[arg(short = 'd', long = "dry_run")]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            println!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config)?;

    init_logging(cli.verbose, &config.logging.level)?;
    info!("Starting github-sync v{}", env!("CARGO_PKG_VERSION"));

    // Everything the run needs is resolved here, before any network activity
    let sync_config = SyncConfig::from_config(
        &config,
        RunOptions {
            token: cli.token,
            dry_run: cli.dry_run,
        },
    )?;

    let target = sync_config.host.as_deref().unwrap_or("api.github.com");
    let host = OctocrabHost::authenticate(&sync_config)
        .await
        .map_err(|e| SyncError::from_host(e, "authenticating against", target))?;

    match cli.create_team {
        Some(args) => cmd_create_team(&host, &sync_config, &args).await,
        None => cmd_scan(&host, &sync_config).await,
    }
}

/// Initialize logging; RUST_LOG wins over --verbose and the configured level
fn init_logging(verbose: bool, level: &str) -> Result<()> {
    let default_level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

/// Report open issues for every organization matching the filters
async fn cmd_scan(host: &OctocrabHost, config: &SyncConfig) -> Result<ExitCode> {
    let mut orchestrator = SyncOrchestrator::new(host, config, std::io::stdout());
    let summary = orchestrator.scan().await?;

    info!(
        "Reported {} issues across {} repositories",
        summary.issues, summary.repositories
    );

    Ok(ExitCode::SUCCESS)
}

/// Create a team in the given organization, honoring --dry_run
async fn cmd_create_team(
    host: &OctocrabHost,
    config: &SyncConfig,
    args: &[String],
) -> Result<ExitCode> {
    let [org_login, team_name] = args else {
        bail!("--create_team expects an organization login and a team name");
    };

    let mut orchestrator = SyncOrchestrator::new(host, config, std::io::stdout());
    let result = orchestrator.create_team(org_login, team_name).await?;

    info!("Team creation finished: {}", result);

    Ok(ExitCode::from(result.exit_status()))
}
