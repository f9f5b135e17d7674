//! GitHub-backed implementation of the git client.
//!
//! Remote repository management goes through the hosting REST API; local
//! working-tree operations shell out to the git CLI (see [`super::git`]).

use super::git::{self, GitClient};
use crate::config::GitHubConfig;
use crate::domain::RepositorySpec;
use crate::error::{ClassifiedError, ErrorKind, GitResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

const ACCEPT_HEADER: &str = "application/vnd.github+json";

/// Git client backed by the GitHub REST API and the local git CLI.
///
/// Credentials and organisation identity are injected once at construction
/// and never read from ambient state.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
    organisation: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedRepository {
    clone_url: String,
}

impl GitHubClient {
    /// Create a client from hosting configuration.
    pub fn new(config: &GitHubConfig) -> Result<Self, ClassifiedError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("scaffolder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClassifiedError::new(ErrorKind::GeneralToolFailure, "Failed to build HTTP client")
                    .with_cause(e)
            })?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            organisation: config.organisation.clone(),
        })
    }

    /// The configured organisation, when any.
    pub fn organisation(&self) -> Option<&str> {
        self.organisation.as_deref()
    }

    /// Org-scoped create endpoint when an organisation is configured, else
    /// the user-scoped endpoint.
    fn create_endpoint(&self) -> String {
        match &self.organisation {
            Some(org) => format!("{}/orgs/{}/repos", self.api_base, org),
            None => format!("{}/user/repos", self.api_base),
        }
    }

    fn delete_endpoint(&self, owner: &str, name: &str) -> String {
        format!("{}/repos/{}/{}", self.api_base, owner, name)
    }
}

/// Whether a remote failure of this class may be retried: rate limiting
/// and server-side failures only.
fn retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl GitClient for GitHubClient {
    async fn create_repository(&self, spec: &RepositorySpec) -> GitResult<String> {
        let body = json!({
            "name": spec.name,
            "private": spec.visibility.is_private(),
            "description": spec.description,
            "has_issues": spec.has_issues,
            "has_projects": spec.has_projects,
            "has_wiki": spec.has_wiki,
            "org": self.organisation,
        });

        tracing::debug!(repository = %spec.name, "Creating remote repository");

        let response = self
            .http
            .post(self.create_endpoint())
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ClassifiedError::new(
                    ErrorKind::RepositoryCreationFailed,
                    "Failed to create the repository on GitHub",
                )
                .with_cause(e)
                .retryable(true)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClassifiedError::new(
                ErrorKind::RepositoryCreationFailed,
                "Failed to create the repository on GitHub",
            )
            .with_cause(format!("{} {}", status, detail.trim()))
            .retryable(retryable_status(status)));
        }

        let created: CreatedRepository = response.json().await.map_err(|e| {
            ClassifiedError::new(
                ErrorKind::RepositoryCreationFailed,
                "Failed to parse repository creation response",
            )
            .with_cause(e)
        })?;

        Ok(created.clone_url)
    }

    async fn delete_repository(&self, name: &str, owner: Option<&str>) -> GitResult<()> {
        let owner = owner.or(self.organisation.as_deref()).ok_or_else(|| {
            ClassifiedError::new(
                ErrorKind::RepositoryDeletionFailed,
                format!(
                    "No owner for repository '{}' and no organisation configured",
                    name
                ),
            )
        })?;

        tracing::debug!(repository = %name, owner = %owner, "Deleting remote repository");

        let response = self
            .http
            .delete(self.delete_endpoint(owner, name))
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .send()
            .await
            .map_err(|e| {
                ClassifiedError::new(
                    ErrorKind::RepositoryDeletionFailed,
                    format!("Failed to delete repository {}/{}", owner, name),
                )
                .with_cause(e)
                .retryable(true)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ClassifiedError::new(
                ErrorKind::RepositoryDeletionFailed,
                format!("Failed to delete repository {}/{}", owner, name),
            )
            .with_cause(format!("{} {}", status, detail.trim()))
            .retryable(retryable_status(status)));
        }

        Ok(())
    }

    async fn add_remote(
        &self,
        local_path: &Path,
        remote_url: &str,
        remote_name: &str,
    ) -> GitResult<()> {
        let dir = local_path.to_path_buf();
        let url = remote_url.to_string();
        let remote = remote_name.to_string();

        tokio::task::spawn_blocking(move || git::add_remote(&dir, &url, &remote))
            .await
            .map_err(|e| {
                ClassifiedError::new(ErrorKind::GeneralToolFailure, "Git task failed")
                    .with_cause(e)
            })?
    }

    async fn commit_and_push(
        &self,
        local_path: &Path,
        message: &str,
        branch: Option<&str>,
    ) -> GitResult<String> {
        let dir = local_path.to_path_buf();
        let message = message.to_string();
        let branch = branch.map(|b| b.to_string());
        let token = self.access_token.clone();

        tokio::task::spawn_blocking(move || {
            git::commit_and_push(&dir, &message, branch.as_deref(), &token)
        })
        .await
        .map_err(|e| {
            ClassifiedError::new(ErrorKind::GeneralToolFailure, "Git task failed").with_cause(e)
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(organisation: Option<&str>) -> GitHubClient {
        GitHubClient::new(&GitHubConfig {
            access_token: "test-token".to_string(),
            organisation: organisation.map(|o| o.to_string()),
            api_base: "https://api.github.com".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_create_endpoint_is_org_scoped_when_configured() {
        assert_eq!(
            client(Some("acme")).create_endpoint(),
            "https://api.github.com/orgs/acme/repos"
        );
        assert_eq!(
            client(None).create_endpoint(),
            "https://api.github.com/user/repos"
        );
    }

    #[test]
    fn test_delete_endpoint() {
        assert_eq!(
            client(Some("acme")).delete_endpoint("acme", "payments-api"),
            "https://api.github.com/repos/acme/payments-api"
        );
    }

    #[test]
    fn test_retryable_status_classes() {
        assert!(retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!retryable_status(StatusCode::UNPROCESSABLE_ENTITY));
        assert!(!retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!retryable_status(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_delete_without_owner_or_organisation_fails() {
        let err = client(None)
            .delete_repository("payments-api", None)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::RepositoryDeletionFailed);
        assert!(!err.retryable);
    }
}
