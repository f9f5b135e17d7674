//! Catalog spec and the serialized component descriptor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const API_VERSION: &str = "backstage.io/v1alpha1";
const ENTITY_KIND: &str = "Component";
const DEFAULT_DESCRIPTION: &str = "TBD";
const DEFAULT_SYSTEM: &str = "platform";

/// Catalog component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    #[default]
    Service,
    Website,
    Library,
    Tool,
}

/// Catalog lifecycle stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Experimental,
    Production,
    Deprecated,
}

/// Input for catalog descriptor generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSpec {
    /// Component name; also names the working directory
    pub name: String,
    /// Owning group
    pub owner: String,
    /// Clone URL of the component's repository
    pub repo_url: String,
    /// Free-form description; descriptor falls back to "TBD"
    #[serde(default)]
    pub description: Option<String>,
    /// Component type, defaulting to service
    #[serde(rename = "type", default)]
    pub component_type: ComponentType,
    /// Lifecycle stage, defaulting to experimental
    #[serde(default)]
    pub lifecycle: Lifecycle,
    /// System the component belongs to
    #[serde(default = "default_system")]
    pub system: String,
}

fn default_system() -> String {
    DEFAULT_SYSTEM.to_string()
}

/// The catalog descriptor as written to `catalog-info.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntity {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: EntityMetadata,
    pub spec: EntitySpec,
}

/// Descriptor metadata block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    pub description: String,
    pub annotations: BTreeMap<String, String>,
}

/// Descriptor spec block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub lifecycle: Lifecycle,
    pub owner: String,
    #[serde(rename = "repoUrl")]
    pub repo_url: String,
    pub system: String,
}

impl CatalogEntity {
    /// Build the descriptor for a catalog spec, applying defaults.
    pub fn from_spec(spec: &CatalogSpec) -> Self {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            "backstage.io/source-location".to_string(),
            format!("url:{}", spec.repo_url),
        );
        annotations.insert("github.com/project-slug".to_string(), spec.name.clone());

        Self {
            api_version: API_VERSION.to_string(),
            kind: ENTITY_KIND.to_string(),
            metadata: EntityMetadata {
                name: spec.name.clone(),
                description: spec
                    .description
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
                annotations,
            },
            spec: EntitySpec {
                component_type: spec.component_type,
                lifecycle: spec.lifecycle,
                owner: spec.owner.clone(),
                repo_url: spec.repo_url.clone(),
                system: spec.system.clone(),
            },
        }
    }
}
