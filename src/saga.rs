//! The provisioning saga: ordered steps with compensating rollback.
//!
//! Sequences validate → create remote repo → scaffold → generate catalog →
//! attach remote → commit & push. Any failure after the remote repository
//! exists triggers compensating deletion, so a failed run leaves no
//! orphaned remote resource behind. Step order is fixed; no control-flow
//! decision is delegated to the caller.

use crate::domain::{
    LocalRepoRef, ProvisioningPolicy, ProvisioningRequest, ProvisioningResult, ProvisioningState,
    RepositorySpec, SagaPhase, Visibility,
};
use crate::error::{ClassifiedError, ErrorKind};
use crate::guard::ProvisioningGuard;
use crate::retry::RetryPolicy;
use crate::services::{CatalogProvider, GitClient, ScaffoldProvider};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, checked between saga steps.
///
/// Cancellation is not "no side effects occurred": a saga cancelled after
/// the remote repository was created still rolls it back.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation after the current step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Orchestrates one provisioning run per call, composed against the
/// capability seams so substrates are swappable without touching the
/// state machine.
pub struct ProvisioningSaga {
    git: Arc<dyn GitClient>,
    scaffolder: Arc<dyn ScaffoldProvider>,
    catalog: Arc<dyn CatalogProvider>,
    guard: Arc<ProvisioningGuard>,
    retry: RetryPolicy,
    policy: ProvisioningPolicy,
}

impl ProvisioningSaga {
    /// Compose a saga from its collaborators and policy.
    pub fn new(
        git: Arc<dyn GitClient>,
        scaffolder: Arc<dyn ScaffoldProvider>,
        catalog: Arc<dyn CatalogProvider>,
        guard: Arc<ProvisioningGuard>,
        retry: RetryPolicy,
        policy: ProvisioningPolicy,
    ) -> Self {
        Self {
            git,
            scaffolder,
            catalog,
            guard,
            retry,
            policy,
        }
    }

    /// Provision a repository, returning the terminal result.
    pub async fn provision(&self, request: ProvisioningRequest) -> ProvisioningResult {
        self.provision_with(request, CancelFlag::new()).await
    }

    /// Provision with a caller-held cancellation flag.
    pub async fn provision_with(
        &self,
        request: ProvisioningRequest,
        cancel: CancelFlag,
    ) -> ProvisioningResult {
        // Held for the whole run; released exactly once on drop
        let _permit = match self.guard.acquire(&request.repository.name) {
            Ok(permit) => permit,
            Err(busy) => {
                return ProvisioningResult::Failure {
                    errors: vec![ClassifiedError::new(
                        ErrorKind::GeneralToolFailure,
                        busy.to_string(),
                    )],
                    rolled_back: false,
                }
            }
        };

        let mut state = ProvisioningState::new();

        match self.execute(&request, &cancel, &mut state).await {
            Ok((remote_url, commit_ref, catalog_path)) => {
                state.enter(SagaPhase::Succeeded);
                tracing::info!(
                    repository = %request.repository.name,
                    commit = %commit_ref,
                    "Provisioning succeeded"
                );
                ProvisioningResult::Success {
                    remote_url,
                    commit_ref,
                    catalog_path,
                }
            }
            Err(error) => {
                state.record_error(error.clone());

                if !state.remote_created {
                    state.enter(SagaPhase::Failed);
                    return ProvisioningResult::Failure {
                        errors: vec![error],
                        rolled_back: false,
                    };
                }

                // The original failure always leads; a rollback failure is
                // attached as a secondary error, never replacing it.
                let mut errors = vec![error];
                if let Err(secondary) = self.roll_back(&request.repository, &mut state).await {
                    errors.push(secondary);
                }
                state.enter(SagaPhase::Failed);

                ProvisioningResult::Failure {
                    errors,
                    rolled_back: true,
                }
            }
        }
    }

    /// Run the forward path of the state machine.
    async fn execute(
        &self,
        request: &ProvisioningRequest,
        cancel: &CancelFlag,
        state: &mut ProvisioningState,
    ) -> Result<(String, String, PathBuf), ClassifiedError> {
        state.enter(SagaPhase::Validating);
        self.validate(request)?;
        self.check_cancelled(cancel)?;

        state.enter(SagaPhase::CreatingRepo);
        let remote_url = self
            .retry
            .run(|| self.git.create_repository(&request.repository))
            .await?;
        state.mark_remote_created(remote_url.clone());
        tracing::info!(
            repository = %request.repository.name,
            remote_url = %remote_url,
            "Remote repository created"
        );
        self.check_cancelled(cancel)?;

        state.enter(SagaPhase::Scaffolding);
        let scaffold = self
            .scaffolder
            .scaffold(&request.project)
            .await
            .map_err(|e| ClassifiedError::wrap(e, ErrorKind::ScaffoldFailed))?;
        state.mark_scaffolded(scaffold.working_dir.clone());
        self.check_cancelled(cancel)?;

        state.enter(SagaPhase::GeneratingCatalog);
        let catalog = self
            .catalog
            .generate_catalog(&request.catalog)
            .await
            .map_err(|e| ClassifiedError::wrap(e, ErrorKind::CatalogGenerationFailed))?;
        state.mark_catalog_written(catalog.catalog_path.clone());
        self.check_cancelled(cancel)?;

        state.enter(SagaPhase::AttachingRemote);
        let local = LocalRepoRef::new(remote_url.clone(), scaffold.working_dir);
        self.git
            .add_remote(&local.local_path, &local.repository_url, &local.remote_name)
            .await?;
        state.mark_remote_attached();
        self.check_cancelled(cancel)?;

        state.enter(SagaPhase::Committing);
        let commit_ref = self
            .git
            .commit_and_push(
                &local.local_path,
                &local.commit_message,
                Some(&local.branch_name),
            )
            .await?;
        state.mark_committed_and_pushed();

        Ok((remote_url, commit_ref, catalog.catalog_path))
    }

    /// Enforce naming, visibility, owner-prefix and organisation policy.
    /// Violations fail here with no side effects.
    fn validate(&self, request: &ProvisioningRequest) -> Result<(), ClassifiedError> {
        request.repository.validate()?;
        request.project.validate()?;

        if request.repository.visibility == Visibility::Public && !self.policy.allow_public {
            return Err(ClassifiedError::new(
                ErrorKind::InvalidRepository,
                format!(
                    "Public repository '{}' is not allowed by policy",
                    request.repository.name
                ),
            ));
        }

        if let Some(owner) = &request.repository.owner {
            match &self.policy.organisation {
                Some(org) if owner == org => {}
                Some(org) => {
                    return Err(ClassifiedError::new(
                        ErrorKind::InvalidRepository,
                        format!(
                            "Repository owner '{}' is not the configured organisation '{}'",
                            owner, org
                        ),
                    ))
                }
                None => {
                    return Err(ClassifiedError::new(
                        ErrorKind::InvalidRepository,
                        format!(
                            "Repository owner '{}' given but no organisation is configured",
                            owner
                        ),
                    ))
                }
            }
        }

        Ok(())
    }

    fn check_cancelled(&self, cancel: &CancelFlag) -> Result<(), ClassifiedError> {
        if cancel.is_cancelled() {
            return Err(ClassifiedError::new(
                ErrorKind::GeneralToolFailure,
                "Provisioning cancelled by caller",
            ));
        }
        Ok(())
    }

    /// Compensating action: delete the created remote repository.
    async fn roll_back(
        &self,
        spec: &RepositorySpec,
        state: &mut ProvisioningState,
    ) -> Result<(), ClassifiedError> {
        state.enter(SagaPhase::RollingBack);
        tracing::warn!(
            repository = %spec.name,
            "Rolling back: deleting created remote repository"
        );

        match self
            .retry
            .run(|| self.git.delete_repository(&spec.name, spec.owner.as_deref()))
            .await
        {
            Ok(()) => {
                state.unwind_remote();
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    repository = %spec.name,
                    error = %err,
                    "Rollback failed; the remote repository may be orphaned"
                );
                Err(err)
            }
        }
    }
}
