//! # envsweep-okteto
//!
//! Okteto preview-environment access for the reconciler: parse the tabular
//! `okteto preview list` output into [`PreviewEnv`] records and destroy
//! environments by name.
//!
//! The `okteto` binary sits behind the [`PreviewCommand`] trait so the parser
//! and the executor are testable without the CLI installed.
//!
//! [`PreviewEnv`]: envsweep_core::PreviewEnv

pub mod cli;
pub mod error;
pub mod listing;

pub use cli::{fetch_environments, OktetoBinary, PreviewCommand};
pub use error::OktetoError;
pub use listing::parse_listing;
