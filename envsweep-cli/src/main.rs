//! Envsweep — GitHub ⇄ Okteto preview-environment reconciler.
//!
//! # Usage
//!
//! ```text
//! envsweep --token <TOKEN> --repository owner/repo --marker okteto.example.dev \
//!          [--ignore production,staging] [--dry-run[=1|true|on]] \
//!          [--api-url <URL>] [--timeout-secs 30] [--deadline-secs 300] \
//!          [--allow-empty-environments]
//! ```
//!
//! Fetches the branch, deployment and preview-environment catalogs, links
//! them, classifies orphans, and deletes both sides' stale records (GitHub
//! deployments oldest-first). `--dry-run` prints the identical plan without
//! deleting anything.

mod output;

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;

use envsweep_core::{config, parse_ignore_list, parse_truthy, Config, Snapshot};
use envsweep_engine::{apply, reconcile};
use envsweep_github::{fetch_branches, fetch_deployments, GithubClient};
use envsweep_okteto::{fetch_environments, OktetoBinary};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "envsweep",
    version,
    about = "Remove orphaned GitHub deployments and Okteto preview environments",
    long_about = None,
)]
struct Cli {
    /// Compute and print the deletion plan without deleting anything.
    /// Accepts the truthy tokens 1, true, on.
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "true",
        default_value = "false",
        value_parser = truthy,
        value_name = "BOOL"
    )]
    dry_run: bool,

    /// GitHub access token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Repository slug, `owner/repo`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// GitHub API base URL (override for GHES).
    #[arg(long, env = "GITHUB_API_URL", default_value = config::DEFAULT_API_URL)]
    api_url: String,

    /// Substring identifying the Okteto instance in deployment status URLs,
    /// e.g. `okteto.example.dev`.
    #[arg(long)]
    marker: String,

    /// Comma- or newline-separated environment names to leave alone.
    #[arg(long, default_value = "")]
    ignore: String,

    /// Per-call HTTP timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Overall run deadline in seconds; fetch overruns abort before any
    /// deletion happens.
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Proceed even when Okteto reports zero environments while deployments
    /// exist (normally refused as a mass-deletion hazard).
    #[arg(long)]
    allow_empty_environments: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            token: self.token,
            repository: self.repository,
            api_url: self.api_url,
            marker: self.marker,
            ignore: parse_ignore_list(&self.ignore),
            dry_run: self.dry_run,
            allow_empty_environments: self.allow_empty_environments,
            timeout: Duration::from_secs(self.timeout_secs),
            deadline: self.deadline_secs.map(Duration::from_secs),
        }
    }
}

fn truthy(s: &str) -> Result<bool, String> {
    Ok(parse_truthy(s))
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_logging();
    let config = Cli::parse().into_config();
    config.validate().context("invalid configuration")?;

    let started = Instant::now();
    let deadline = config.deadline.map(|limit| started + limit);

    let github = GithubClient::new(&config);
    let okteto = OktetoBinary::new();

    // Fetch phase. Any failure here is fatal: deletions are irreversible and
    // must never run against partial or stale catalogs.
    println!("# Fetching branches...");
    let branches = fetch_branches(&github).context("failed to fetch branches")?;
    println!("# Fetching GitHub deployments...");
    let deployments = fetch_deployments(&github, &config.marker, &config.ignore)
        .context("failed to fetch deployments")?;
    println!("# Fetching Okteto preview environments...");
    let environments =
        fetch_environments(&okteto).context("failed to list preview environments")?;

    let snapshot = Snapshot {
        branches,
        deployments,
        environments,
    };
    output::print_snapshot(&snapshot);

    if deadline.is_some_and(|d| Instant::now() >= d) {
        bail!("run deadline exceeded during the fetch phase; no deletions attempted");
    }

    let plan = reconcile(&snapshot, config.allow_empty_environments)
        .context("refusing to reconcile")?;
    output::print_plan(&plan, config.dry_run);

    let Some(report) = apply(&plan, config.dry_run, &github, &okteto, deadline) else {
        return Ok(());
    };
    output::print_report(&report);
    if !report.all_succeeded() {
        bail!("{} deletion(s) failed", report.failures.len());
    }
    Ok(())
}
