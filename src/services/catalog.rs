//! Catalog capability: generate the component descriptor for a project.

use crate::domain::{CatalogEntity, CatalogSpec};
use crate::error::{ClassifiedError, ErrorKind};
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// File name of the catalog descriptor inside the working directory.
pub const CATALOG_FILE_NAME: &str = "catalog-info.yaml";

/// Output of a successful catalog generation.
#[derive(Debug, Clone)]
pub struct CatalogOutput {
    /// Path of the written descriptor
    pub catalog_path: PathBuf,
}

/// Capability interface for writing the catalog descriptor.
///
/// Requires the working directory from the scaffold step to already exist.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn generate_catalog(&self, spec: &CatalogSpec) -> anyhow::Result<CatalogOutput>;
}

/// Writes `catalog-info.yaml` into the scaffolded working directory.
pub struct YamlCatalogWriter {
    base_directory: PathBuf,
}

impl YamlCatalogWriter {
    /// Create a writer rooted at the scaffold base directory.
    pub fn new(base_directory: PathBuf) -> Self {
        Self { base_directory }
    }
}

#[async_trait]
impl CatalogProvider for YamlCatalogWriter {
    async fn generate_catalog(&self, spec: &CatalogSpec) -> anyhow::Result<CatalogOutput> {
        let project_path = self.base_directory.join(&spec.name);

        if !project_path.exists() {
            tracing::error!(
                "Project directory does not exist: {}",
                project_path.display()
            );
            return Err(ClassifiedError::new(
                ErrorKind::CatalogGenerationFailed,
                format!(
                    "Project directory {} is missing; scaffold the project first",
                    project_path.display()
                ),
            )
            .into());
        }

        let catalog_path = project_path.join(CATALOG_FILE_NAME);
        let entity = CatalogEntity::from_spec(spec);

        let yaml = serde_yaml::to_string(&entity).map_err(|e| {
            ClassifiedError::new(
                ErrorKind::CatalogGenerationFailed,
                format!("Failed to serialize catalog descriptor for {}", spec.name),
            )
            .with_cause(e)
        })?;

        fs::write(&catalog_path, yaml).map_err(|e| {
            ClassifiedError::new(
                ErrorKind::CatalogGenerationFailed,
                format!(
                    "Failed to write catalog descriptor at {}",
                    catalog_path.display()
                ),
            )
            .with_cause(e)
        })?;

        Ok(CatalogOutput { catalog_path })
    }
}
