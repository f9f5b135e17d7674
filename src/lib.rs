//! scaffolder: repository provisioning saga with compensating rollback.
//!
//! This crate provisions a new source repository and scaffolds a project
//! inside it (create remote repo, scaffold files, generate a catalog
//! descriptor, wire the local working copy to the remote, commit and push)
//! as one unit of work that either fully succeeds or leaves no orphaned
//! remote resource behind.

pub mod config;
pub mod domain;
pub mod error;
pub mod guard;
pub mod retry;
pub mod saga;
pub mod services;

pub use config::ScaffolderConfig;
pub use error::{ClassifiedError, ErrorKind};
pub use saga::{CancelFlag, ProvisioningSaga};
