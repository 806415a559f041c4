//! Branch and deployment catalog construction.
//!
//! Deployment admission is two-stage: a cheap task/ignore-list pre-filter,
//! then the expensive per-record statuses fetch that looks for an
//! `environment_url` containing the provisioner's domain marker. Only the
//! survivors of the pre-filter pay for the secondary fetch.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use envsweep_core::{BranchName, Deployment, DeploymentId};

use crate::{client::GithubClient, error::GithubError};

/// Repository-scoped paged reads; implemented by [`GithubClient`] and by
/// stubs in tests.
pub trait PagedApi {
    fn records(&self, endpoint: &str) -> Result<Vec<Value>, GithubError>;
}

impl PagedApi for GithubClient {
    fn records(&self, endpoint: &str) -> Result<Vec<Value>, GithubError> {
        GithubClient::records(self, endpoint)
    }
}

/// Raw deployment record as the API returns it.
#[derive(Debug, Deserialize)]
struct DeploymentRecord {
    id: u64,
    environment: String,
    #[serde(rename = "ref")]
    git_ref: String,
    task: String,
    created_at: String,
}

/// All live branch names, order as returned by the API.
pub fn fetch_branches(api: &impl PagedApi) -> Result<Vec<BranchName>, GithubError> {
    let records = api.records("branches")?;
    let mut branches = Vec::with_capacity(records.len());
    for record in records {
        let name = record
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| GithubError::Payload {
                url: "branches".to_string(),
                detail: "branch record without a name field".to_string(),
            })?;
        branches.push(BranchName::from(name));
    }
    Ok(branches)
}

/// All deployment records recognized as belonging to the provisioner.
///
/// A record is admitted when `task == "deploy"`, its environment name is not
/// in `ignore`, and some status entry carries an `environment_url`
/// containing `marker` — that URL becomes the record's resolved URL.
pub fn fetch_deployments(
    api: &impl PagedApi,
    marker: &str,
    ignore: &[String],
) -> Result<Vec<Deployment>, GithubError> {
    let records = api.records("deployments")?;
    let mut deployments = Vec::new();
    for record in records {
        let raw: DeploymentRecord =
            serde_json::from_value(record).map_err(|err| GithubError::Payload {
                url: "deployments".to_string(),
                detail: err.to_string(),
            })?;
        if raw.task != "deploy" {
            continue;
        }
        if ignore.iter().any(|name| *name == raw.environment) {
            tracing::debug!(environment = %raw.environment, "ignored by configuration");
            continue;
        }
        let Some(url) = environment_url(api, raw.id, marker)? else {
            tracing::debug!(
                environment = %raw.environment,
                id = raw.id,
                "no status URL matching the provisioner marker"
            );
            continue;
        };
        deployments.push(Deployment {
            id: DeploymentId(raw.id),
            environment: raw.environment,
            branch: BranchName::from_ref(&raw.git_ref),
            created_at: parse_created_at(&raw.created_at)?,
            url,
        });
    }
    Ok(deployments)
}

/// First status entry whose `environment_url` contains the marker.
fn environment_url(
    api: &impl PagedApi,
    id: u64,
    marker: &str,
) -> Result<Option<String>, GithubError> {
    let endpoint = format!("deployments/{id}/statuses");
    let statuses = api.records(&endpoint)?;
    for status in statuses {
        if let Some(url) = status.get("environment_url").and_then(Value::as_str) {
            if url.contains(marker) {
                return Ok(Some(url.to_string()));
            }
        }
    }
    Ok(None)
}

fn parse_created_at(value: &str) -> Result<DateTime<Utc>, GithubError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| GithubError::Timestamp {
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned records per endpoint; tracks which endpoints were hit.
    struct StubApi {
        endpoints: HashMap<String, Vec<Value>>,
        calls: RefCell<Vec<String>>,
    }

    impl StubApi {
        fn new(endpoints: Vec<(&str, Vec<Value>)>) -> Self {
            Self {
                endpoints: endpoints
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl PagedApi for StubApi {
        fn records(&self, endpoint: &str) -> Result<Vec<Value>, GithubError> {
            self.calls.borrow_mut().push(endpoint.to_string());
            self.endpoints
                .get(endpoint)
                .cloned()
                .ok_or(GithubError::Status {
                    status: 404,
                    url: endpoint.to_string(),
                })
        }
    }

    fn deployment_record(id: u64, environment: &str, git_ref: &str, task: &str) -> Value {
        json!({
            "id": id,
            "environment": environment,
            "ref": git_ref,
            "task": task,
            "created_at": "2024-01-01T00:00:00Z",
            "sha": "abc123",
        })
    }

    fn status(url: &str) -> Value {
        json!({ "state": "success", "environment_url": url })
    }

    const MARKER: &str = "okteto.example.dev";

    #[test]
    fn branches_extract_names_in_order() {
        let api = StubApi::new(vec![(
            "branches",
            vec![json!({"name": "main"}), json!({"name": "feat-a"})],
        )]);
        let branches = fetch_branches(&api).expect("branches");
        assert_eq!(
            branches,
            vec![BranchName::from("main"), BranchName::from("feat-a")]
        );
    }

    #[test]
    fn branch_without_name_is_a_payload_error() {
        let api = StubApi::new(vec![("branches", vec![json!({"label": "x"})])]);
        assert!(matches!(
            fetch_branches(&api),
            Err(GithubError::Payload { .. })
        ));
    }

    #[test]
    fn admits_deploy_task_with_marker_url() {
        let api = StubApi::new(vec![
            (
                "deployments",
                vec![deployment_record(7, "preview-x", "refs/heads/feat-a", "deploy")],
            ),
            (
                "deployments/7/statuses",
                vec![
                    status("https://ci.example.com/logs/7"),
                    status("https://preview-x.okteto.example.dev"),
                ],
            ),
        ]);
        let deployments = fetch_deployments(&api, MARKER, &[]).expect("deployments");
        assert_eq!(deployments.len(), 1);
        let d = &deployments[0];
        assert_eq!(d.id, DeploymentId(7));
        assert_eq!(d.branch, BranchName::from("feat-a"));
        assert_eq!(d.url, "https://preview-x.okteto.example.dev");
    }

    #[test]
    fn non_deploy_tasks_skip_the_statuses_fetch() {
        let api = StubApi::new(vec![(
            "deployments",
            vec![deployment_record(1, "pages", "main", "pages_build")],
        )]);
        let deployments = fetch_deployments(&api, MARKER, &[]).expect("deployments");
        assert!(deployments.is_empty());
        // The pre-filter rejected the record before the expensive lookup.
        assert_eq!(*api.calls.borrow(), vec!["deployments"]);
    }

    #[test]
    fn ignored_environments_skip_the_statuses_fetch() {
        let api = StubApi::new(vec![(
            "deployments",
            vec![deployment_record(2, "production", "main", "deploy")],
        )]);
        let ignore = vec!["production".to_string()];
        let deployments = fetch_deployments(&api, MARKER, &ignore).expect("deployments");
        assert!(deployments.is_empty());
        assert_eq!(*api.calls.borrow(), vec!["deployments"]);
    }

    #[test]
    fn record_without_marker_url_is_discarded() {
        let api = StubApi::new(vec![
            (
                "deployments",
                vec![deployment_record(3, "preview-y", "main", "deploy")],
            ),
            (
                "deployments/3/statuses",
                vec![status("https://ci.example.com/logs/3")],
            ),
        ]);
        let deployments = fetch_deployments(&api, MARKER, &[]).expect("deployments");
        assert!(deployments.is_empty());
    }

    #[test]
    fn statuses_fetch_error_propagates() {
        let api = StubApi::new(vec![(
            "deployments",
            vec![deployment_record(4, "preview-z", "main", "deploy")],
        )]);
        assert!(matches!(
            fetch_deployments(&api, MARKER, &[]),
            Err(GithubError::Status { status: 404, .. })
        ));
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let mut record = deployment_record(5, "preview-w", "main", "deploy");
        record["created_at"] = json!("yesterday");
        let api = StubApi::new(vec![
            ("deployments", vec![record]),
            (
                "deployments/5/statuses",
                vec![status("https://preview-w.okteto.example.dev")],
            ),
        ]);
        assert!(matches!(
            fetch_deployments(&api, MARKER, &[]),
            Err(GithubError::Timestamp { .. })
        ));
    }
}
