//! Staleness classification.
//!
//! Orphan rules, evaluated against the pre-deletion snapshot:
//! 1. a deployment is orphaned if its branch no longer exists (cascading to
//!    its linked environment) or if it has no linked environment;
//! 2. an environment is orphaned if it has no linked deployment — checked
//!    after the cascade, and never queued twice.

use std::collections::{BTreeSet, HashSet};

use envsweep_core::{Deployment, PreviewEnv, Snapshot};

use crate::{error::EngineError, matcher::LinkTable};

/// Why a deployment record is queued for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentReason {
    /// Its branch is gone from the repository.
    BranchMissing,
    /// No live preview environment corresponds to it.
    EnvironmentMissing,
}

/// Why a preview environment is queued for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentReason {
    /// Cascaded from a linked deployment whose branch is gone.
    BranchCascade,
    /// No deployment record corresponds to it.
    DeploymentMissing,
}

/// A deployment queued for deletion, with its reason class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDeployment {
    pub deployment: Deployment,
    pub reason: DeploymentReason,
}

/// An environment queued for destruction, with its reason class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEnvironment {
    pub environment: PreviewEnv,
    pub reason: EnvironmentReason,
}

/// The deletion plan: full records, not just identifiers, so deletions can
/// be performed (or printed) directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub deployments: Vec<PlannedDeployment>,
    pub environments: Vec<PlannedEnvironment>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.deployments.is_empty() && self.environments.is_empty()
    }
}

/// Apply the orphan rules to an immutable snapshot. Output order is
/// as-discovered; [`crate::schedule`] imposes the execution order.
///
/// Refuses to classify when the environment catalog is empty but deployments
/// exist, unless `allow_empty_environments` is set: an empty or malformed
/// listing would otherwise queue every deployment.
pub fn classify(
    snapshot: &Snapshot,
    links: &LinkTable,
    allow_empty_environments: bool,
) -> Result<Plan, EngineError> {
    if snapshot.environments.is_empty()
        && !snapshot.deployments.is_empty()
        && !allow_empty_environments
    {
        return Err(EngineError::EmptyEnvironmentCatalog {
            deployments: snapshot.deployments.len(),
        });
    }

    let branches: BTreeSet<&str> = snapshot.branches.iter().map(|b| b.0.as_str()).collect();

    let mut plan = Plan::default();
    let mut queued_envs: HashSet<usize> = HashSet::new();

    for (i, deployment) in snapshot.deployments.iter().enumerate() {
        // Tolerate a link table built from different catalogs: an index with
        // no entry (or pointing past the arena) reads as unlinked.
        let linked_env = links.env_for_deployment.get(i).copied().flatten();
        if !branches.contains(deployment.branch.0.as_str()) {
            tracing::info!(
                environment = %deployment.environment,
                branch = %deployment.branch,
                "branch missing for deployment"
            );
            plan.deployments.push(PlannedDeployment {
                deployment: deployment.clone(),
                reason: DeploymentReason::BranchMissing,
            });
            // Branch deletion cascades to both sides.
            if let Some(j) = linked_env {
                if let Some(env) = snapshot.environments.get(j) {
                    if queued_envs.insert(j) {
                        plan.environments.push(PlannedEnvironment {
                            environment: env.clone(),
                            reason: EnvironmentReason::BranchCascade,
                        });
                    }
                }
            }
        } else if linked_env.is_none() {
            tracing::info!(
                environment = %deployment.environment,
                "preview environment missing for deployment"
            );
            plan.deployments.push(PlannedDeployment {
                deployment: deployment.clone(),
                reason: DeploymentReason::EnvironmentMissing,
            });
        }
    }

    for (j, env) in snapshot.environments.iter().enumerate() {
        let linked_deployment = links.deployment_for_env.get(j).copied().flatten();
        if linked_deployment.is_none() && !queued_envs.contains(&j) {
            tracing::info!(environment = %env.name, "deployment record missing for environment");
            plan.environments.push(PlannedEnvironment {
                environment: env.clone(),
                reason: EnvironmentReason::DeploymentMissing,
            });
        }
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher;
    use chrono::{TimeZone, Utc};
    use envsweep_core::{BranchName, DeploymentId};

    fn deployment(id: u64, environment: &str, branch: &str, url: &str) -> Deployment {
        Deployment {
            id: DeploymentId(id),
            environment: environment.to_string(),
            branch: BranchName::from(branch),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            url: url.to_string(),
        }
    }

    fn env(name: &str) -> PreviewEnv {
        PreviewEnv {
            name: name.to_string(),
            scope: "personal".to_string(),
            sleeping: false,
        }
    }

    fn snapshot(
        branches: &[&str],
        deployments: Vec<Deployment>,
        environments: Vec<PreviewEnv>,
    ) -> Snapshot {
        Snapshot {
            branches: branches.iter().map(|b| BranchName::from(*b)).collect(),
            deployments,
            environments,
        }
    }

    fn plan_for(snapshot: &Snapshot) -> Plan {
        let links = matcher::link(&snapshot.deployments, &snapshot.environments);
        classify(snapshot, &links, true).expect("classify")
    }

    #[test]
    fn branch_missing_queues_deployment() {
        let snap = snapshot(
            &["main", "feat-a"],
            vec![deployment(
                1,
                "preview-x",
                "feat-b",
                "https://preview-x.okteto.example.dev",
            )],
            vec![],
        );
        let plan = plan_for(&snap);
        assert_eq!(plan.deployments.len(), 1);
        assert_eq!(plan.deployments[0].deployment.id, DeploymentId(1));
        assert_eq!(plan.deployments[0].reason, DeploymentReason::BranchMissing);
        assert!(plan.environments.is_empty());
    }

    #[test]
    fn branch_missing_cascades_to_linked_environment() {
        let snap = snapshot(
            &["main"],
            vec![deployment(
                1,
                "preview-x",
                "feat-gone",
                "https://preview-x.okteto.example.dev",
            )],
            vec![env("preview-x")],
        );
        let plan = plan_for(&snap);
        assert_eq!(plan.deployments.len(), 1);
        assert_eq!(plan.environments.len(), 1);
        assert_eq!(plan.environments[0].environment.name, "preview-x");
        assert_eq!(
            plan.environments[0].reason,
            EnvironmentReason::BranchCascade
        );
    }

    #[test]
    fn cascaded_environment_is_not_requeued() {
        // The cascaded environment has a linked deployment, so rule 2 would
        // skip it anyway; this guards the bookkeeping if rules drift.
        let snap = snapshot(
            &["main"],
            vec![deployment(
                1,
                "preview-x",
                "feat-gone",
                "https://preview-x.okteto.example.dev",
            )],
            vec![env("preview-x"), env("preview-orphan")],
        );
        let plan = plan_for(&snap);
        let names: Vec<&str> = plan
            .environments
            .iter()
            .map(|p| p.environment.name.as_str())
            .collect();
        assert_eq!(names, vec!["preview-x", "preview-orphan"]);
        assert_eq!(
            plan.environments[1].reason,
            EnvironmentReason::DeploymentMissing
        );
    }

    #[test]
    fn linked_pair_on_live_branch_is_kept() {
        let snap = snapshot(
            &["main"],
            vec![deployment(
                2,
                "preview-y",
                "main",
                "https://preview-y.okteto.example.dev",
            )],
            vec![env("preview-y")],
        );
        let plan = plan_for(&snap);
        assert!(plan.is_empty());
    }

    #[test]
    fn unlinked_deployment_on_live_branch_is_queued() {
        let snap = snapshot(
            &["main"],
            vec![deployment(
                3,
                "preview-z",
                "main",
                "https://preview-z.okteto.example.dev",
            )],
            vec![env("unrelated")],
        );
        let plan = plan_for(&snap);
        assert_eq!(plan.deployments.len(), 1);
        assert_eq!(
            plan.deployments[0].reason,
            DeploymentReason::EnvironmentMissing
        );
        assert_eq!(plan.environments.len(), 1);
        assert_eq!(plan.environments[0].environment.name, "unrelated");
    }

    #[test]
    fn empty_environment_catalog_is_refused_without_override() {
        let snap = snapshot(
            &["main"],
            vec![deployment(
                1,
                "preview-x",
                "main",
                "https://preview-x.okteto.example.dev",
            )],
            vec![],
        );
        let links = matcher::link(&snap.deployments, &snap.environments);
        let err = classify(&snap, &links, false).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EmptyEnvironmentCatalog { deployments: 1 }
        ));

        // Override proceeds and queues the deployment.
        let plan = classify(&snap, &links, true).expect("override");
        assert_eq!(plan.deployments.len(), 1);
    }

    #[test]
    fn undersized_link_table_reads_as_unlinked() {
        // A table built from different catalogs must not panic; records with
        // no entry classify as unlinked.
        let snap = snapshot(
            &["main"],
            vec![
                deployment(1, "preview-x", "main", "https://preview-x.okteto.example.dev"),
                deployment(2, "preview-y", "gone", "https://preview-y.okteto.example.dev"),
            ],
            vec![env("preview-x"), env("preview-y")],
        );
        let stale_links = LinkTable {
            env_for_deployment: vec![],
            deployment_for_env: vec![],
        };
        let plan = classify(&snap, &stale_links, false).expect("classify");
        // Both deployments read as unlinked; the cascade from id 2 finds no
        // environment entry, so both environments fall out of rule 2.
        assert_eq!(plan.deployments.len(), 2);
        assert_eq!(plan.environments.len(), 2);
        assert!(plan
            .environments
            .iter()
            .all(|p| p.reason == EnvironmentReason::DeploymentMissing));
    }

    #[test]
    fn empty_both_catalogs_is_fine_without_override() {
        let snap = snapshot(&["main"], vec![], vec![]);
        let links = matcher::link(&snap.deployments, &snap.environments);
        let plan = classify(&snap, &links, false).expect("classify");
        assert!(plan.is_empty());
    }
}
