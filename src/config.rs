//! Configuration management for the scaffolder.
//!
//! Supports layered configuration: defaults → project → user → env

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScaffolderConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub scaffold: ScaffoldConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ScaffolderConfig {
    /// Load configuration with hierarchy: defaults → project → user → env
    pub fn load(project_root: Option<&PathBuf>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();

        // 1. Start with defaults
        builder = builder.add_source(
            config::File::from_str(
                include_str!("../default_config.toml"),
                config::FileFormat::Toml,
            )
            .required(false),
        );

        // 2. Project-specific config (.scaffolder.toml in project root)
        if let Some(root) = project_root {
            let project_config = root.join(".scaffolder.toml");
            if project_config.exists() {
                builder = builder.add_source(File::from(project_config).required(false));
            }
        }

        // 3. User config (~/.config/scaffolder/config.toml)
        if let Some(config_dir) = directories::ProjectDirs::from("com", "scaffolder", "scaffolder")
        {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(File::from(user_config).required(false));
            }
        }

        // 4. Environment variables (SCAFFOLDER__*)
        builder = builder.add_source(
            Environment::with_prefix("SCAFFOLDER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration with default settings only
    pub fn load_defaults() -> Self {
        Self::default()
    }
}

/// Remote hosting API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Access token with repo and admin:org scopes
    #[serde(default)]
    pub access_token: String,
    /// Organisation repositories are created in; user-scoped when absent
    #[serde(default)]
    pub organisation: Option<String>,
    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl GitHubConfig {
    /// Per-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            organisation: None,
            api_base: default_api_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

/// Scaffolding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// Root directory working copies are scaffolded under
    #[serde(default = "default_base_directory")]
    pub base_directory: PathBuf,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
        }
    }
}

fn default_base_directory() -> PathBuf {
    PathBuf::from("/tmp/scaffolder")
}

/// Provisioning policy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Allow explicitly-requested public repositories
    #[serde(default)]
    pub allow_public: bool,
}

/// Retry/backoff configuration for remote calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base backoff in milliseconds, doubled per attempt
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
}

impl RetryConfig {
    /// Base backoff as a Duration
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_backoff_ms: default_base_backoff_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_backoff_ms() -> u64 {
    100
}
