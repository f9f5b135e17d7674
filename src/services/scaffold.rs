//! Scaffold capability: produce project files on disk for a project spec.

use crate::domain::{ProjectSpec, ProjectType};
use crate::error::{ClassifiedError, ErrorKind};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};

/// Output of a successful scaffold run.
#[derive(Debug, Clone)]
pub struct ScaffoldOutput {
    /// Directory the project was scaffolded into
    pub working_dir: PathBuf,
    /// Human-readable summary
    pub message: String,
}

/// Capability interface for producing project files on disk.
///
/// Implementations classify their own failures where they can; anything
/// else is collapsed at the saga boundary.
#[async_trait]
pub trait ScaffoldProvider: Send + Sync {
    async fn scaffold(&self, spec: &ProjectSpec) -> anyhow::Result<ScaffoldOutput>;
}

/// Filesystem scaffolder writing a deterministic minimal skeleton per
/// project type.
pub struct FsScaffolder {
    base_directory: PathBuf,
}

impl FsScaffolder {
    /// Create a scaffolder rooted at `base_directory`.
    pub fn new(base_directory: PathBuf) -> Self {
        Self { base_directory }
    }

    /// Working directory for a project name under the scaffold root.
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.base_directory.join(name)
    }

    /// Recreate the project directory destructively to guarantee a clean
    /// tree.
    fn ensure_project_directory(&self, project_path: &Path) -> Result<(), ClassifiedError> {
        if project_path.exists() {
            fs::remove_dir_all(project_path).map_err(|e| {
                ClassifiedError::new(
                    ErrorKind::ScaffoldFailed,
                    format!(
                        "Failed to clear project directory {}",
                        project_path.display()
                    ),
                )
                .with_cause(e)
            })?;
        }

        fs::create_dir_all(project_path).map_err(|e| {
            ClassifiedError::new(
                ErrorKind::ScaffoldFailed,
                format!(
                    "Failed to create project directory {}",
                    project_path.display()
                ),
            )
            .with_cause(e)
        })?;

        tracing::info!("Creating new project directory: {}", project_path.display());
        Ok(())
    }

    fn write_file(path: &Path, contents: &str) -> Result<(), ClassifiedError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ClassifiedError::new(
                    ErrorKind::ScaffoldFailed,
                    format!("Failed to create {}", parent.display()),
                )
                .with_cause(e)
            })?;
        }

        fs::write(path, contents).map_err(|e| {
            ClassifiedError::new(
                ErrorKind::ScaffoldFailed,
                format!("Failed to write {}", path.display()),
            )
            .with_cause(e)
        })
    }

    fn write_skeleton(&self, project_path: &Path, spec: &ProjectSpec) -> Result<(), ClassifiedError> {
        Self::write_file(
            &project_path.join("README.md"),
            &format!(
                "# {}\n\nScaffolded {} owned by {}.\n\nRepository: {}\n",
                spec.name, spec.project_type, spec.owner, spec.repo_url
            ),
        )?;
        Self::write_file(&project_path.join(".gitignore"), GITIGNORE)?;

        match spec.project_type {
            ProjectType::App | ProjectType::Library | ProjectType::InfraConstruct => {
                Self::write_file(
                    &project_path.join("package.json"),
                    &package_json(spec),
                )?;
                Self::write_file(&project_path.join("src/index.ts"), INDEX_TS)?;
                if spec.project_type == ProjectType::App {
                    Self::write_file(&project_path.join("tsconfig.json"), TSCONFIG_JSON)?;
                }
            }
            ProjectType::JavaApp => {
                Self::write_file(&project_path.join("pom.xml"), &pom_xml(spec))?;
                Self::write_file(
                    &project_path.join("src/main/java/App.java"),
                    APP_JAVA,
                )?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ScaffoldProvider for FsScaffolder {
    async fn scaffold(&self, spec: &ProjectSpec) -> anyhow::Result<ScaffoldOutput> {
        let project_path = self.project_path(&spec.name);

        self.ensure_project_directory(&project_path)?;
        self.write_skeleton(&project_path, spec)?;

        Ok(ScaffoldOutput {
            message: format!(
                "Project {} scaffolded successfully at {}.",
                spec.name,
                project_path.display()
            ),
            working_dir: project_path,
        })
    }
}

fn package_json(spec: &ProjectSpec) -> String {
    format!(
        "{{\n  \"name\": \"{}\",\n  \"version\": \"0.1.0\",\n  \"author\": \"{} <{}>\",\n  \"repository\": \"{}\"\n}}\n",
        spec.name, spec.author_name, spec.author_email, spec.repo_url
    )
}

fn pom_xml(spec: &ProjectSpec) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n  <modelVersion>4.0.0</modelVersion>\n  <groupId>{}</groupId>\n  <artifactId>{}</artifactId>\n  <version>0.1.0</version>\n</project>\n",
        spec.owner.trim_start_matches("group:"),
        spec.name
    )
}

const GITIGNORE: &str = "node_modules/\ndist/\ntarget/\n.env\n";

const INDEX_TS: &str = "export {};\n";

const TSCONFIG_JSON: &str =
    "{\n  \"compilerOptions\": {\n    \"strict\": true,\n    \"outDir\": \"dist\"\n  }\n}\n";

const APP_JAVA: &str =
    "public class App {\n    public static void main(String[] args) {\n    }\n}\n";
