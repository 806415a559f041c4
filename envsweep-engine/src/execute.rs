//! Deletion scheduling and execution.
//!
//! GitHub refuses to delete the active (most recent) deployment for an
//! environment while older inactive ones remain, so deployment deletions run
//! oldest-first. Environment destroys have no ordering constraint and run in
//! discovery order, after the deployments.
//!
//! Failure policy is uniform across both registries: a failed deletion is
//! recorded and the batch continues. The caller decides what a non-empty
//! failure list means for the process exit code.

use std::error::Error;
use std::time::Instant;

use envsweep_core::DeploymentId;

use crate::classify::Plan;

/// Boxed error returned by the deleter seams.
pub type DeleteError = Box<dyn Error + Send + Sync>;

/// Deletes deployment records from the hosting service.
pub trait DeploymentDeleter {
    fn delete_deployment(&self, id: DeploymentId) -> Result<(), DeleteError>;
}

/// Destroys preview environments at the provisioning service.
pub trait EnvironmentDestroyer {
    fn destroy_environment(&self, name: &str) -> Result<(), DeleteError>;
}

/// One deletion that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteFailure {
    /// Human-readable target, e.g. `deployment preview-x (id 7)`.
    pub target: String,
    pub error: String,
}

/// Outcome of executing a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub deleted_deployments: usize,
    pub destroyed_environments: usize,
    pub failures: Vec<DeleteFailure>,
}

impl ExecutionReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Impose execution order on a plan: deployments ascending by creation time
/// (stable for ties), environments untouched.
pub fn schedule(plan: &mut Plan) {
    plan.deployments
        .sort_by_key(|p| p.deployment.created_at);
}

/// Execute a scheduled plan against both registries.
///
/// `deadline` is the overall run deadline; once passed, remaining deletions
/// are skipped and recorded as failures rather than racing stale state.
pub fn execute(
    plan: &Plan,
    deployments: &dyn DeploymentDeleter,
    environments: &dyn EnvironmentDestroyer,
    deadline: Option<Instant>,
) -> ExecutionReport {
    let mut report = ExecutionReport::default();

    for planned in &plan.deployments {
        let target = format!(
            "deployment {} (id {})",
            planned.deployment.environment, planned.deployment.id
        );
        if past_deadline(deadline) {
            skip(&mut report, target);
            continue;
        }
        match deployments.delete_deployment(planned.deployment.id) {
            Ok(()) => {
                tracing::info!(%target, "deleted");
                report.deleted_deployments += 1;
            }
            Err(err) => {
                tracing::warn!(%target, error = %err, "deletion failed");
                report.failures.push(DeleteFailure {
                    target,
                    error: err.to_string(),
                });
            }
        }
    }

    for planned in &plan.environments {
        let target = format!("environment {}", planned.environment.name);
        if past_deadline(deadline) {
            skip(&mut report, target);
            continue;
        }
        match environments.destroy_environment(&planned.environment.name) {
            Ok(()) => {
                tracing::info!(%target, "destroyed");
                report.destroyed_environments += 1;
            }
            Err(err) => {
                tracing::warn!(%target, error = %err, "destroy failed");
                report.failures.push(DeleteFailure {
                    target,
                    error: err.to_string(),
                });
            }
        }
    }

    report
}

/// Apply a plan unless this is a dry run.
///
/// A dry run (or an empty plan) performs zero delete calls and returns
/// `None`; otherwise the plan executes and its report is returned. This is
/// the only path from a plan to the registries, so the dry-run guarantee
/// lives here rather than in binary wiring.
pub fn apply(
    plan: &Plan,
    dry_run: bool,
    deployments: &dyn DeploymentDeleter,
    environments: &dyn EnvironmentDestroyer,
    deadline: Option<Instant>,
) -> Option<ExecutionReport> {
    if dry_run || plan.is_empty() {
        return None;
    }
    Some(execute(plan, deployments, environments, deadline))
}

fn past_deadline(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn skip(report: &mut ExecutionReport, target: String) {
    tracing::warn!(%target, "run deadline exceeded; skipping");
    report.failures.push(DeleteFailure {
        target,
        error: "run deadline exceeded before deletion".to_string(),
    });
}
