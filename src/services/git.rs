//! Local git operations for the provisioning saga.
//!
//! Uses the git CLI via std::process::Command. All operations are blocking
//! and callers wrap them with spawn_blocking.

use crate::domain::RepositorySpec;
use crate::error::{ClassifiedError, ErrorKind, GitResult};
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;

const REMOTE_URL_PATTERN: &str = "^(git@|https://)";
const DEFAULT_BRANCH: &str = "main";
const SCAFFOLD_BRANCH: &str = "feat/initial_scaffold";

// Fixed service identity for commits made by the saga.
const COMMITTER_NAME: &str = "Scaffolder AI";
const COMMITTER_EMAIL: &str = "scaffolder.ai@devdoodles.space";

/// Uniform interface over remote repository hosting and the local working
/// tree. The saga composes against this seam; every failure surfaces as a
/// [`ClassifiedError`].
#[async_trait]
pub trait GitClient: Send + Sync {
    /// Create the remote repository, returning its clone URL.
    async fn create_repository(&self, spec: &RepositorySpec) -> GitResult<String>;

    /// Delete a remote repository. `owner` defaults to the configured
    /// organisation when omitted.
    async fn delete_repository(&self, name: &str, owner: Option<&str>) -> GitResult<()>;

    /// Initialise `local_path` as a working tree if needed and attach
    /// `remote_url` under `remote_name`.
    async fn add_remote(
        &self,
        local_path: &Path,
        remote_url: &str,
        remote_name: &str,
    ) -> GitResult<()>;

    /// Branch, stage, commit and push the working tree, returning the
    /// commit SHA. `branch` defaults to the initial scaffold branch.
    async fn commit_and_push(
        &self,
        local_path: &Path,
        message: &str,
        branch: Option<&str>,
    ) -> GitResult<String>;
}

/// Check whether a directory is a git working tree.
pub(crate) fn is_git_repository(dir: &Path) -> bool {
    dir.join(".git").exists()
}

/// Validate a git remote URL. Raises `InvalidRemote` without touching disk.
pub(crate) fn validate_remote_url(url: &str) -> GitResult<()> {
    let pattern = Regex::new(REMOTE_URL_PATTERN).expect("remote URL pattern compiles");
    if !pattern.is_match(url) {
        return Err(ClassifiedError::new(
            ErrorKind::InvalidRemote,
            format!("Invalid git remote URL '{}'", url),
        ));
    }
    Ok(())
}

/// Run a git subcommand in `dir`, returning trimmed stdout or stderr text.
fn run_git(dir: &Path, args: &[&str]) -> Result<String, String> {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| format!("Failed to run git: {}", e))?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Initialise the working tree if needed and attach the remote.
pub(crate) fn add_remote(dir: &Path, url: &str, remote_name: &str) -> GitResult<()> {
    validate_remote_url(url)?;

    if !is_git_repository(dir) {
        run_git(dir, &["init", "-b", DEFAULT_BRANCH]).map_err(|e| {
            ClassifiedError::new(
                ErrorKind::InvalidRemoteOrigin,
                "Failed to initialise git repository",
            )
            .with_cause(e)
        })?;
    }

    run_git(dir, &["remote", "add", remote_name, url]).map_err(|e| {
        ClassifiedError::new(
            ErrorKind::InvalidRemoteOrigin,
            format!("Failed to add remote '{}'", remote_name),
        )
        .with_cause(e)
    })?;

    Ok(())
}

/// Branch, stage, commit and push. Steps run strictly in this order; a
/// failure aborts the remainder.
pub(crate) fn commit_and_push(
    dir: &Path,
    message: &str,
    branch: Option<&str>,
    access_token: &str,
) -> GitResult<String> {
    if !is_git_repository(dir) {
        return Err(ClassifiedError::new(
            ErrorKind::InvalidRepositoryFolder,
            "Commit and push: not a git repository",
        ));
    }

    let branch = branch.unwrap_or(SCAFFOLD_BRANCH);

    run_git(dir, &["checkout", "-b", branch]).map_err(|e| {
        ClassifiedError::new(
            ErrorKind::InvalidBranch,
            format!("Failed to create and checkout branch '{}'", branch),
        )
        .with_cause(e)
    })?;

    for (key, value) in [("user.name", COMMITTER_NAME), ("user.email", COMMITTER_EMAIL)] {
        run_git(dir, &["config", key, value]).map_err(|e| {
            ClassifiedError::new(ErrorKind::CommitFailed, "Failed to set committer identity")
                .with_cause(e)
        })?;
    }

    run_git(dir, &["add", "--all"]).map_err(|e| {
        ClassifiedError::new(ErrorKind::CommitFailed, "Failed to stage files for commit")
            .with_cause(e)
    })?;

    run_git(dir, &["commit", "-m", message]).map_err(|e| {
        ClassifiedError::new(ErrorKind::CommitFailed, "Failed to commit files").with_cause(e)
    })?;

    let commit_ref = run_git(dir, &["rev-parse", "HEAD"]).map_err(|e| {
        ClassifiedError::new(ErrorKind::CommitFailed, "Failed to resolve commit").with_cause(e)
    })?;

    let push_target = push_target(dir, "origin", access_token)?;
    run_git(dir, &["push", &push_target, branch]).map_err(|e| {
        ClassifiedError::new(ErrorKind::PushFailed, "Failed to push to remote repository")
            .with_cause(e)
    })?;

    Ok(commit_ref)
}

/// Resolve what to push to: the credentialed URL for https remotes, the
/// remote name otherwise.
fn push_target(dir: &Path, remote_name: &str, access_token: &str) -> GitResult<String> {
    let url = run_git(dir, &["remote", "get-url", remote_name]).map_err(|e| {
        ClassifiedError::new(
            ErrorKind::PushFailed,
            format!("Failed to resolve remote '{}'", remote_name),
        )
        .with_cause(e)
    })?;

    Ok(with_push_credentials(&url, access_token).unwrap_or_else(|| remote_name.to_string()))
}

/// Inject the access token as the username half of an https push URL, with
/// an empty password. The credentialed URL is passed on the command line
/// only, never written to git config.
fn with_push_credentials(url: &str, access_token: &str) -> Option<String> {
    if access_token.is_empty() {
        return None;
    }

    url.strip_prefix("https://")
        .map(|rest| format!("https://{}@{}", access_token, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> String {
        run_git(dir, args).unwrap()
    }

    fn create_bare_remote(temp: &TempDir) -> PathBuf {
        let bare = temp.path().join("remote.git");
        std::fs::create_dir_all(&bare).unwrap();
        git(&bare, &["init", "--bare"]);
        bare
    }

    #[test]
    fn test_validate_remote_url() {
        assert!(validate_remote_url("git@github.com:acme/payments-api.git").is_ok());
        assert!(validate_remote_url("https://github.com/acme/payments-api.git").is_ok());

        let err = validate_remote_url("ftp://host/x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRemote);
    }

    #[test]
    fn test_add_remote_initialises_and_attaches() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("payments-api");
        std::fs::create_dir_all(&dir).unwrap();

        add_remote(&dir, "https://github.com/acme/payments-api.git", "origin").unwrap();

        assert!(is_git_repository(&dir));
        assert_eq!(
            git(&dir, &["remote", "get-url", "origin"]),
            "https://github.com/acme/payments-api.git"
        );
    }

    #[test]
    fn test_add_remote_rejects_invalid_url_before_init() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("payments-api");
        std::fs::create_dir_all(&dir).unwrap();

        let err = add_remote(&dir, "ftp://host/x", "origin").unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidRemote);
        assert!(!is_git_repository(&dir));
    }

    #[test]
    fn test_add_remote_skips_init_for_existing_repository() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("payments-api");
        std::fs::create_dir_all(&dir).unwrap();
        git(&dir, &["init", "-b", "main"]);

        add_remote(&dir, "git@github.com:acme/payments-api.git", "origin").unwrap();
        assert_eq!(
            git(&dir, &["remote", "get-url", "origin"]),
            "git@github.com:acme/payments-api.git"
        );
    }

    #[test]
    fn test_commit_and_push_requires_repository() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("payments-api");
        std::fs::create_dir_all(&dir).unwrap();

        let err = commit_and_push(&dir, "chore(init): initial commit", None, "").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRepositoryFolder);
    }

    #[test]
    fn test_commit_and_push_to_local_remote() {
        let temp = TempDir::new().unwrap();
        let bare = create_bare_remote(&temp);
        let dir = temp.path().join("payments-api");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("README.md"), "# payments-api").unwrap();

        git(&dir, &["init", "-b", "main"]);
        git(&dir, &["remote", "add", "origin", bare.to_str().unwrap()]);

        let sha = commit_and_push(&dir, "chore(init): initial commit", None, "").unwrap();

        assert_eq!(sha.len(), 40);
        // The scaffold branch made it to the remote
        assert_eq!(git(&bare, &["rev-parse", "feat/initial_scaffold"]), sha);
        // Committer identity is the fixed service identity
        assert_eq!(git(&dir, &["log", "-1", "--format=%an"]), COMMITTER_NAME);
    }

    #[test]
    fn test_commit_and_push_honours_branch_override() {
        let temp = TempDir::new().unwrap();
        let bare = create_bare_remote(&temp);
        let dir = temp.path().join("payments-api");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("README.md"), "# payments-api").unwrap();

        git(&dir, &["init", "-b", "main"]);
        git(&dir, &["remote", "add", "origin", bare.to_str().unwrap()]);

        let sha = commit_and_push(&dir, "chore(init): initial commit", Some("init"), "").unwrap();
        assert_eq!(git(&bare, &["rev-parse", "init"]), sha);
    }

    #[test]
    fn test_push_credential_injection() {
        assert_eq!(
            with_push_credentials("https://github.com/acme/payments-api.git", "token-123"),
            Some("https://token-123@github.com/acme/payments-api.git".to_string())
        );
        // Non-https remotes push by remote name instead
        assert_eq!(
            with_push_credentials("git@github.com:acme/payments-api.git", "token-123"),
            None
        );
        assert_eq!(
            with_push_credentials("https://github.com/acme/payments-api.git", ""),
            None
        );
    }
}
