//! Cross-registry matching.
//!
//! Relates each preview environment to at most one deployment record. Links
//! are held in an index-based [`LinkTable`] over the two immutable catalogs;
//! records never point at each other.
//!
//! Lookup order per environment:
//! 1. exact key — the first DNS label of a deployment's resolved URL host
//!    equals the environment name;
//! 2. fallback — first deployment, in catalog order, whose URL contains the
//!    environment name as a substring.
//!
//! First match wins on both paths; an already-linked deployment is skipped.

use std::collections::HashMap;

use envsweep_core::{Deployment, PreviewEnv};

/// The (at most) 1:1 relation between deployments and environments, by
/// catalog index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTable {
    /// `env_for_deployment[i]` is the environment index linked to
    /// deployment `i`, if any.
    pub env_for_deployment: Vec<Option<usize>>,
    /// `deployment_for_env[j]` is the deployment index linked to
    /// environment `j`, if any.
    pub deployment_for_env: Vec<Option<usize>>,
}

/// Link environments to deployments. Pure; deterministic for a given pair of
/// catalogs, so running it twice yields identical links.
pub fn link(deployments: &[Deployment], environments: &[PreviewEnv]) -> LinkTable {
    let mut table = LinkTable {
        env_for_deployment: vec![None; deployments.len()],
        deployment_for_env: vec![None; environments.len()],
    };

    // Exact-key index: first deployment per key wins.
    let mut by_key: HashMap<&str, usize> = HashMap::new();
    for (i, deployment) in deployments.iter().enumerate() {
        if let Some(key) = url_key(&deployment.url) {
            by_key.entry(key).or_insert(i);
        }
    }

    for (j, env) in environments.iter().enumerate() {
        if let Some(&i) = by_key.get(env.name.as_str()) {
            if table.env_for_deployment[i].is_none() {
                table.env_for_deployment[i] = Some(j);
                table.deployment_for_env[j] = Some(i);
                continue;
            }
        }

        // Substring containment can mislink when one environment name is a
        // prefix of another; it only runs when no exact key matched.
        for (i, deployment) in deployments.iter().enumerate() {
            if table.env_for_deployment[i].is_some() {
                continue;
            }
            if deployment.url.contains(&env.name) {
                tracing::debug!(
                    environment = %env.name,
                    deployment = %deployment.id,
                    url = %deployment.url,
                    "linked via substring fallback"
                );
                table.env_for_deployment[i] = Some(j);
                table.deployment_for_env[j] = Some(i);
                break;
            }
        }
    }

    table
}

/// Matching key of a deployment URL: the first DNS label of its host.
/// `https://app-pr-7.okteto.example.dev/` → `app-pr-7`.
fn url_key(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = rest.split(|c| c == '/' || c == ':').next()?;
    let label = host.split('.').next()?;
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}
