//! Infrastructure services for the scaffolder.
//!
//! This module contains:
//! - GitClient / GitHubClient: remote hosting API and local git operations
//! - ScaffoldProvider / FsScaffolder: project scaffolding capability
//! - CatalogProvider / YamlCatalogWriter: catalog descriptor capability

pub mod catalog;
pub mod git;
pub mod github;
pub mod scaffold;

pub use catalog::{CatalogOutput, CatalogProvider, YamlCatalogWriter, CATALOG_FILE_NAME};
pub use git::GitClient;
pub use github::GitHubClient;
pub use scaffold::{FsScaffolder, ScaffoldOutput, ScaffoldProvider};
