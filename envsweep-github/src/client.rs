//! Blocking GitHub REST client over `ureq`.

use serde_json::Value;
use ureq::Agent;

use envsweep_core::{config::PAGE_SIZE, Config, DeploymentId};
use envsweep_engine::{DeleteError, DeploymentDeleter};

use crate::{
    error::GithubError,
    pages::{self, next_link, Page, PageSource},
};

const API_VERSION: &str = "2022-11-28";
const ACCEPT: &str = "application/vnd.github+json";

/// Authenticated client scoped to one repository.
pub struct GithubClient {
    agent: Agent,
    api_url: String,
    repository: String,
    token: String,
}

impl GithubClient {
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self {
            agent,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repository: config.repository.clone(),
            token: config.token.clone(),
        }
    }

    /// First-page URL for a repository endpoint, with the page size pinned.
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/repos/{}/{}?per_page={}",
            self.api_url, self.repository, endpoint, PAGE_SIZE
        )
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", ACCEPT)
            .set("X-GitHub-Api-Version", API_VERSION)
    }

    /// Every record of a paged repository endpoint, across all pages.
    pub fn records(&self, endpoint: &str) -> Result<Vec<Value>, GithubError> {
        pages::fetch_all(self, self.endpoint_url(endpoint))
    }

    /// Delete a deployment record. GitHub signals success with 204 exactly;
    /// anything else is a failure.
    pub fn delete_deployment_by_id(&self, id: DeploymentId) -> Result<(), GithubError> {
        let url = format!("{}/repos/{}/deployments/{}", self.api_url, self.repository, id);
        tracing::debug!(%url, "DELETE");
        match self.request("DELETE", &url).call() {
            Ok(response) if response.status() == 204 => Ok(()),
            Ok(response) => Err(GithubError::Status {
                status: response.status(),
                url,
            }),
            Err(err) => Err(map_ureq_error(&url, err)),
        }
    }
}

impl PageSource for GithubClient {
    fn fetch_page(&self, url: &str) -> Result<Page, GithubError> {
        tracing::debug!(%url, "GET");
        let response = self
            .request("GET", url)
            .call()
            .map_err(|err| map_ureq_error(url, err))?;

        // The Link header must be captured before the body consumes the
        // response.
        let next = response.header("link").and_then(next_link);
        let body: Value = response.into_json().map_err(|source| GithubError::Body {
            url: url.to_string(),
            source,
        })?;
        match body {
            Value::Array(records) => Ok(Page { records, next }),
            other => Err(GithubError::Payload {
                url: url.to_string(),
                detail: format!("expected a JSON array, got {}", type_name(&other)),
            }),
        }
    }
}

impl DeploymentDeleter for GithubClient {
    fn delete_deployment(&self, id: DeploymentId) -> Result<(), DeleteError> {
        self.delete_deployment_by_id(id).map_err(Into::into)
    }
}

fn map_ureq_error(url: &str, err: ureq::Error) -> GithubError {
    match err {
        ureq::Error::Status(status, _) => GithubError::Status {
            status,
            url: url.to_string(),
        },
        ureq::Error::Transport(transport) => GithubError::Transport {
            url: url.to_string(),
            message: transport.to_string(),
        },
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
