//! # envsweep-engine
//!
//! The cross-system reconciliation engine: matcher, staleness classifier,
//! deletion plan and executor.
//!
//! Call [`reconcile`] with an immutable [`Snapshot`] to get the deletion
//! [`Plan`] in final execution order, then [`apply`] it against the two
//! registries. A dry run performs zero delete calls; the plan it prints is
//! identical to what a live run deletes.

pub mod classify;
pub mod error;
pub mod execute;
pub mod matcher;

pub use classify::{
    DeploymentReason, EnvironmentReason, Plan, PlannedDeployment, PlannedEnvironment,
};
pub use error::EngineError;
pub use execute::{
    apply, execute, schedule, DeleteError, DeleteFailure, DeploymentDeleter,
    EnvironmentDestroyer, ExecutionReport,
};
pub use matcher::LinkTable;

use envsweep_core::Snapshot;

/// Link, classify and order in one pass over an immutable snapshot.
///
/// The returned plan is in final execution order: deployments sorted
/// oldest-first, environments in discovery order.
pub fn reconcile(snapshot: &Snapshot, allow_empty_environments: bool) -> Result<Plan, EngineError> {
    let links = matcher::link(&snapshot.deployments, &snapshot.environments);
    let mut plan = classify::classify(snapshot, &links, allow_empty_environments)?;
    schedule(&mut plan);
    Ok(plan)
}
