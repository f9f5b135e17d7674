//! Repository spec and local working-copy reference.

use crate::error::{ClassifiedError, ErrorKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kebab-case, no leading/trailing hyphen, 3–40 chars total.
const NAME_PATTERN: &str = "^[a-z0-9][a-z0-9-]{2,39}$";

/// Repository visibility on the hosting provider.
///
/// The hosting API only offers a private/public boolean; "internal"
/// requests map to `Private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

impl Visibility {
    /// Value of the hosting API's `private` flag for this visibility.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private)
    }
}

/// The remote repository to be provisioned. Immutable once a saga starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySpec {
    /// Repository name, validated against the naming policy
    pub name: String,
    /// Repository description shown on the hosting provider
    #[serde(default)]
    pub description: String,
    /// Visibility, defaulting to private
    #[serde(default)]
    pub visibility: Visibility,
    /// Enable the issue tracker
    #[serde(default = "default_true")]
    pub has_issues: bool,
    /// Enable the wiki
    #[serde(default)]
    pub has_wiki: bool,
    /// Enable project boards
    #[serde(default)]
    pub has_projects: bool,
    /// Owning organisation; must match the configured organisation when set
    #[serde(default)]
    pub owner: Option<String>,
}

impl RepositorySpec {
    /// Check a repository name against the naming policy.
    pub fn is_valid_name(name: &str) -> bool {
        let pattern = Regex::new(NAME_PATTERN).expect("naming pattern compiles");
        pattern.is_match(name)
    }

    /// Validate the spec's shape. Policy checks (visibility, organisation
    /// allow-list) live in the saga's validation step.
    pub fn validate(&self) -> Result<(), ClassifiedError> {
        if !Self::is_valid_name(&self.name) {
            return Err(ClassifiedError::new(
                ErrorKind::InvalidRepository,
                format!(
                    "Repository name '{}' must match {}",
                    self.name, NAME_PATTERN
                ),
            ));
        }

        Ok(())
    }
}

/// Reference to a local working copy and how to wire it to its remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalRepoRef {
    /// Clone URL of the remote repository
    pub repository_url: String,
    /// Local working directory
    pub local_path: PathBuf,
    /// Remote name to attach the URL under
    #[serde(default = "default_remote_name")]
    pub remote_name: String,
    /// Commit message for the initial commit
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
    /// Branch the initial commit is pushed on
    #[serde(default = "default_branch_name")]
    pub branch_name: String,
}

impl LocalRepoRef {
    /// Create a reference with the default remote, message and branch.
    pub fn new(repository_url: impl Into<String>, local_path: PathBuf) -> Self {
        Self {
            repository_url: repository_url.into(),
            local_path,
            remote_name: default_remote_name(),
            commit_message: default_commit_message(),
            branch_name: default_branch_name(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_remote_name() -> String {
    "origin".to_string()
}

fn default_commit_message() -> String {
    "chore(init): initial commit".to_string()
}

fn default_branch_name() -> String {
    "feat/initial_scaffold".to_string()
}
