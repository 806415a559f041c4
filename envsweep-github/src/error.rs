//! Error types for envsweep-github.

use thiserror::Error;

/// All errors that can arise from GitHub API access.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Connection, TLS or DNS failure before a response arrived.
    #[error("transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// The API answered with a status the caller does not accept.
    #[error("unexpected status {status} for {url}")]
    Status { status: u16, url: String },

    /// The response body could not be read or was not valid JSON.
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The JSON had an unexpected shape (not an array, missing fields).
    #[error("unexpected payload from {url}: {detail}")]
    Payload { url: String, detail: String },

    /// A deployment's `created_at` was not valid RFC 3339.
    #[error("bad created_at timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
