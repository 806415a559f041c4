//! Envsweep core library — domain types, run configuration, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes, catalog records, the run snapshot
//! - [`config`] — explicit [`Config`] value plus input parsing helpers
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{parse_ignore_list, parse_truthy, Config};
pub use error::ConfigError;
pub use types::{BranchName, Deployment, DeploymentId, PreviewEnv, Snapshot};
