//! Domain types for a single reconciliation run.
//!
//! Catalogs are fetched once per run and immutable afterwards. Records carry
//! no links to each other; the engine's `LinkTable` relates them by index.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A git branch name, normalized (no `refs/heads/` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchName(pub String);

impl BranchName {
    /// Normalize a ref into a branch name by stripping a `refs/heads/`
    /// prefix if present.
    pub fn from_ref(r: &str) -> Self {
        Self(r.strip_prefix("refs/heads/").unwrap_or(r).to_owned())
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BranchName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BranchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The hosting service's numeric deployment id, assigned externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeploymentId(pub u64);

impl fmt::Display for DeploymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for DeploymentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Catalog records
// ---------------------------------------------------------------------------

/// A GitHub deployment record admitted to the reconciliation catalog.
///
/// Admission already happened at fetch time: `task == "deploy"`, the
/// environment name is not ignored, and some status carried an
/// `environment_url` containing the provisioner's domain marker (that URL is
/// stored in `url`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    /// Environment name as recorded by the hosting service.
    pub environment: String,
    pub branch: BranchName,
    pub created_at: DateTime<Utc>,
    /// Target environment URL discovered from the deployment's status history.
    pub url: String,
}

/// A live Okteto preview environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewEnv {
    /// Unique within the provisioning service.
    pub name: String,
    pub scope: String,
    pub sleeping: bool,
}

/// The immutable pre-deletion snapshot of both registries plus the branch
/// catalog. Built once per run; never re-read mid-run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub branches: Vec<BranchName>,
    pub deployments: Vec<Deployment>,
    pub environments: Vec<PreviewEnv>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
