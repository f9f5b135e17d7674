//! scaffolder: provision a repository from a request file.
//!
//! Reads a provisioning request (repository, project and catalog specs) as
//! JSON, runs one saga, and prints the terminal result as JSON on stdout.

use anyhow::{Context, Result};
use scaffolder::config::ScaffolderConfig;
use scaffolder::domain::{ProvisioningPolicy, ProvisioningRequest};
use scaffolder::guard::ProvisioningGuard;
use scaffolder::retry::RetryPolicy;
use scaffolder::saga::{CancelFlag, ProvisioningSaga};
use scaffolder::services::{FsScaffolder, GitHubClient, YamlCatalogWriter};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with RUST_LOG environment variable support
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let request_path = std::env::args()
        .nth(1)
        .context("Usage: scaffolder <request.json>")?;

    let request_text = std::fs::read_to_string(&request_path)
        .with_context(|| format!("Failed to read {}", request_path))?;
    let request: ProvisioningRequest = serde_json::from_str(&request_text)
        .with_context(|| format!("Failed to parse provisioning request {}", request_path))?;

    let config = ScaffolderConfig::load(std::env::current_dir().ok().as_ref())?;

    tracing::info!(
        repository = %request.repository.name,
        "Starting provisioning saga"
    );

    let git = Arc::new(GitHubClient::new(&config.github)?);
    let saga = ProvisioningSaga::new(
        git,
        Arc::new(FsScaffolder::new(config.scaffold.base_directory.clone())),
        Arc::new(YamlCatalogWriter::new(config.scaffold.base_directory.clone())),
        Arc::new(ProvisioningGuard::new()),
        RetryPolicy::new(config.retry.max_retries, config.retry.base_backoff()),
        ProvisioningPolicy {
            organisation: config.github.organisation.clone(),
            allow_public: config.policy.allow_public,
        },
    );

    // Ctrl+C requests cancellation; the saga still rolls back a created
    // remote repository before reporting.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, cancelling after the current step");
                cancel.cancel();
            }
        });
    }

    let result = saga.provision_with(request, cancel).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
