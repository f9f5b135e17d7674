//! Domain entities for the scaffolder.
//!
//! This module contains the core business entities:
//! - RepositorySpec: the remote repository to be provisioned
//! - ProjectSpec: the project to scaffold into the working copy
//! - CatalogSpec: the catalog descriptor for the component
//! - ProvisioningState: one saga run's working memory and result types

mod catalog;
mod project;
mod provisioning;
mod repository;

pub use catalog::{CatalogEntity, CatalogSpec, ComponentType, EntityMetadata, EntitySpec, Lifecycle};
pub use project::{ProjectSpec, ProjectType};
pub use provisioning::{
    ProvisioningPolicy, ProvisioningRequest, ProvisioningResult, ProvisioningState, SagaPhase,
};
pub use repository::{LocalRepoRef, RepositorySpec, Visibility};
