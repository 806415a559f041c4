//! Run configuration.
//!
//! Everything the clients and the engine need is carried in one explicit
//! [`Config`] value built by the binary and threaded through constructors.
//! There is no ambient/module-level state.

use std::time::Duration;

use crate::error::ConfigError;

/// Default GitHub REST endpoint, overridable for GHES installs.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Page size for paged GitHub reads. The upstream API caps `per_page` at 100.
pub const PAGE_SIZE: u32 = 100;

/// Default per-call HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one reconciliation run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Opaque bearer credential for the hosting service.
    pub token: String,
    /// `owner/repo` slug identifying the repository.
    pub repository: String,
    /// Base URL of the hosting service's REST API.
    pub api_url: String,
    /// Substring identifying the provisioning service in environment URLs
    /// (e.g. `okteto.example.dev`).
    pub marker: String,
    /// Environment names excluded from reconciliation entirely.
    pub ignore: Vec<String>,
    /// Compute and print the plan without deleting anything.
    pub dry_run: bool,
    /// Proceed even if the provisioner reports zero environments while
    /// deployments exist.
    pub allow_empty_environments: bool,
    /// Per-call HTTP timeout.
    pub timeout: Duration,
    /// Overall run deadline; `None` means unbounded.
    pub deadline: Option<Duration>,
}

impl Config {
    /// Validate fields that clap cannot check shape-wise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        let mut parts = self.repository.splitn(2, '/');
        let owner = parts.next().unwrap_or("");
        let repo = parts.next().unwrap_or("");
        if owner.is_empty() || repo.is_empty() {
            return Err(ConfigError::BadRepository {
                value: self.repository.clone(),
            });
        }
        if self.marker.trim().is_empty() {
            return Err(ConfigError::MissingMarker);
        }
        Ok(())
    }
}

/// Parse a truthy CLI/environment token. `"1"`, `"true"` and `"on"`
/// (case-insensitive) are true; everything else is false.
pub fn parse_truthy(s: &str) -> bool {
    matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "on")
}

/// Split a comma- or newline-separated ignore-list into trimmed, non-empty
/// environment names.
pub fn parse_ignore_list(s: &str) -> Vec<String> {
    s.split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}
