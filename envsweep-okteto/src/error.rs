//! Error types for envsweep-okteto.

use thiserror::Error;

/// All errors that can arise from okteto CLI access.
#[derive(Debug, Error)]
pub enum OktetoError {
    /// The `okteto` process could not be spawned.
    #[error("failed to run `okteto {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    /// The `okteto` process exited non-zero.
    #[error("`okteto {args}` failed (status {status}): {stderr}")]
    CommandFailed {
        args: String,
        status: String,
        stderr: String,
    },

    /// The listing output had no recognizable header row.
    #[error("preview listing has no header row naming a '{missing}' column")]
    MalformedListing { missing: &'static str },
}
