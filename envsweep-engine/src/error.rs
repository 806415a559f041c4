//! Error types for envsweep-engine.

use thiserror::Error;

/// All errors that can arise from reconciliation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The provisioner reported zero environments while deployments exist.
    /// Classifying anyway would queue every deployment for deletion, so this
    /// requires an explicit override.
    #[error(
        "provisioner returned zero environments while {deployments} deployment(s) exist; \
         refusing to plan a mass deletion (pass --allow-empty-environments to override)"
    )]
    EmptyEnvironmentCatalog { deployments: usize },
}
