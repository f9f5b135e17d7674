//! Provisioning saga state and result types.

use super::{CatalogSpec, ProjectSpec, RepositorySpec};
use crate::error::ClassifiedError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The input bundle accepted by the provisioning entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningRequest {
    /// Remote repository to create
    pub repository: RepositorySpec,
    /// Project to scaffold into the working copy
    pub project: ProjectSpec,
    /// Catalog descriptor for the component
    pub catalog: CatalogSpec,
}

/// Policy inputs for the saga's validation step.
#[derive(Debug, Clone, Default)]
pub struct ProvisioningPolicy {
    /// Organisation repositories may be created in; also the delete default
    pub organisation: Option<String>,
    /// Whether explicitly-requested public repositories are allowed
    pub allow_public: bool,
}

/// Phase of a provisioning saga run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SagaPhase {
    Validating,
    CreatingRepo,
    Scaffolding,
    GeneratingCatalog,
    AttachingRemote,
    Committing,
    RollingBack,
    Succeeded,
    Failed,
}

impl SagaPhase {
    /// Check if the saga has reached a terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for SagaPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One saga run's working memory.
///
/// Owned exclusively by the saga; transitions are monotonic. A step once
/// marked done is never un-done except by rollback, which unwinds
/// `remote_created` only.
#[derive(Debug, Clone)]
pub struct ProvisioningState {
    /// Current phase
    pub phase: SagaPhase,
    /// The rollback boundary: set once the remote repository exists
    pub remote_created: bool,
    /// Clone URL returned by repository creation
    pub remote_url: Option<String>,
    /// Working directory produced by the scaffold step
    pub working_dir: Option<PathBuf>,
    /// Path of the generated catalog descriptor
    pub catalog_path: Option<PathBuf>,
    pub scaffolded: bool,
    pub catalog_written: bool,
    pub remote_attached: bool,
    pub committed: bool,
    pub pushed: bool,
    /// Most recent step failure
    pub last_error: Option<ClassifiedError>,
}

impl ProvisioningState {
    /// Create the working memory for a fresh saga run
    pub fn new() -> Self {
        Self {
            phase: SagaPhase::Validating,
            remote_created: false,
            remote_url: None,
            working_dir: None,
            catalog_path: None,
            scaffolded: false,
            catalog_written: false,
            remote_attached: false,
            committed: false,
            pushed: false,
            last_error: None,
        }
    }

    /// Advance to the next phase
    pub fn enter(&mut self, phase: SagaPhase) {
        self.phase = phase;
    }

    /// Record the rollback boundary: the remote repository now exists.
    pub fn mark_remote_created(&mut self, remote_url: String) {
        self.remote_created = true;
        self.remote_url = Some(remote_url);
    }

    /// Unwind the rollback boundary after compensating deletion.
    pub fn unwind_remote(&mut self) {
        self.remote_created = false;
    }

    pub fn mark_scaffolded(&mut self, working_dir: PathBuf) {
        self.scaffolded = true;
        self.working_dir = Some(working_dir);
    }

    pub fn mark_catalog_written(&mut self, catalog_path: PathBuf) {
        self.catalog_written = true;
        self.catalog_path = Some(catalog_path);
    }

    pub fn mark_remote_attached(&mut self) {
        self.remote_attached = true;
    }

    pub fn mark_committed_and_pushed(&mut self) {
        self.committed = true;
        self.pushed = true;
    }

    pub fn record_error(&mut self, error: ClassifiedError) {
        self.last_error = Some(error);
    }
}

impl Default for ProvisioningState {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal result of one provisioning saga run.
///
/// Exactly two shapes: success with the three output values, or failure
/// with a non-empty error list and an explicit rollback flag.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProvisioningResult {
    Success {
        #[serde(rename = "repositoryUrl")]
        remote_url: String,
        #[serde(rename = "commitRef")]
        commit_ref: String,
        #[serde(rename = "catalogPath")]
        catalog_path: PathBuf,
    },
    Failure {
        errors: Vec<ClassifiedError>,
        #[serde(rename = "rolledBack")]
        rolled_back: bool,
    },
}

impl ProvisioningResult {
    /// Check if the saga succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether compensating deletion ran for this result
    pub fn rolled_back(&self) -> bool {
        matches!(self, Self::Failure { rolled_back: true, .. })
    }
}
