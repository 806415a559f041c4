//! Error types for envsweep-core.

use thiserror::Error;

/// All errors that can arise from run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The access credential was absent or blank.
    #[error("access token is missing; pass --token or set GITHUB_TOKEN")]
    MissingToken,

    /// The repository slug was not `owner/repo`.
    #[error("repository '{value}' is not an owner/repo slug")]
    BadRepository { value: String },

    /// The provisioning-service domain marker was absent or blank.
    #[error("domain marker is missing; pass --marker")]
    MissingMarker,
}
