//! Project spec describing what gets scaffolded into the working copy.

use crate::error::{ClassifiedError, ErrorKind};
use serde::{Deserialize, Serialize};

/// Minimum length for project names in the reference policy.
const MIN_NAME_LEN: usize = 10;

/// Prefix required for project owners (catalog group identity).
const OWNER_PREFIX: &str = "group:";

/// Kind of project to scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectType {
    /// Application with a runnable entry point
    App,
    /// Reusable library package
    Library,
    /// Infrastructure-as-code construct
    InfraConstruct,
    /// Maven-based Java application
    JavaApp,
}

impl ProjectType {
    /// Get the display name for this project type
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Library => "library",
            Self::InfraConstruct => "infra-construct",
            Self::JavaApp => "java-app",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The project to scaffold. Validated before any side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    /// Project name; also names the working directory under the scaffold root
    pub name: String,
    /// Kind of project to scaffold
    pub project_type: ProjectType,
    /// Owning group, `group:`-prefixed
    pub owner: String,
    /// Clone URL of the repository the project belongs to
    pub repo_url: String,
    /// Author recorded in scaffolded metadata
    pub author_name: String,
    /// Author contact recorded in scaffolded metadata
    pub author_email: String,
}

impl ProjectSpec {
    /// Validate the project spec against the naming and ownership policy.
    ///
    /// The `group:` prefix is a hard requirement; a malformed owner is
    /// rejected rather than rewritten.
    pub fn validate(&self) -> Result<(), ClassifiedError> {
        if self.name.len() < MIN_NAME_LEN {
            return Err(ClassifiedError::new(
                ErrorKind::InvalidRepository,
                format!(
                    "Project name '{}' must be at least {} characters",
                    self.name, MIN_NAME_LEN
                ),
            ));
        }

        if !self.owner.starts_with(OWNER_PREFIX) {
            return Err(ClassifiedError::new(
                ErrorKind::InvalidRepository,
                format!(
                    "Project owner '{}' must start with '{}'",
                    self.owner, OWNER_PREFIX
                ),
            ));
        }

        if !self.author_email.contains('@') {
            return Err(ClassifiedError::new(
                ErrorKind::InvalidRepository,
                format!("Author email '{}' is not an email address", self.author_email),
            ));
        }

        Ok(())
    }
}
