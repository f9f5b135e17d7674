//! Unified error types for the scaffolder.
//!
//! Every failure crossing the git/remote boundary is converted into exactly
//! one [`ClassifiedError`] carrying a closed-set [`ErrorKind`], so callers
//! branch on kind and retryability instead of string matching.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Closed set of failure kinds for git and remote operations.
///
/// Each kind has a stable numeric code so results can be correlated across
/// process boundaries without relying on variant names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Fallback kind for failures with no finer classification.
    GeneralToolFailure,
    /// Repository spec failed validation (naming, visibility, owner policy).
    InvalidRepository,
    /// Remote repository creation failed.
    RepositoryCreationFailed,
    /// Remote repository deletion failed.
    RepositoryDeletionFailed,
    /// Push to the remote failed.
    PushFailed,
    /// Local path is not a git working tree.
    InvalidRepositoryFolder,
    /// Remote URL failed validation.
    InvalidRemote,
    /// Initialising the working tree or attaching the remote failed.
    InvalidRemoteOrigin,
    /// Creating or checking out the branch failed.
    InvalidBranch,
    /// Staging or committing files failed.
    CommitFailed,
    /// The scaffold capability failed.
    ScaffoldFailed,
    /// The catalog-generation capability failed.
    CatalogGenerationFailed,
}

impl ErrorKind {
    /// Stable numeric identity for this kind.
    pub fn code(&self) -> u16 {
        match self {
            Self::GeneralToolFailure => 1000,
            Self::InvalidRepository => 1001,
            Self::RepositoryCreationFailed => 1002,
            Self::RepositoryDeletionFailed => 1003,
            Self::PushFailed => 1004,
            Self::InvalidRepositoryFolder => 2001,
            Self::InvalidRemote => 2002,
            Self::InvalidRemoteOrigin => 2003,
            Self::InvalidBranch => 2004,
            Self::CommitFailed => 2005,
            Self::ScaffoldFailed => 3001,
            Self::CatalogGenerationFailed => 3002,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A failure classified at the point it crossed into git/remote territory.
///
/// The underlying cause is folded into the message and kept separately for
/// diagnostics; the raw error type never leaks past this layer.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct ClassifiedError {
    /// Failure class, from the closed taxonomy.
    pub kind: ErrorKind,
    /// Stable numeric code for `kind`.
    pub code: u16,
    /// Human-readable description, including the cause when present.
    pub message: String,
    /// Underlying cause, when one was captured.
    pub cause: Option<String>,
    /// Whether the retry policy may re-attempt the operation.
    pub retryable: bool,
}

impl ClassifiedError {
    /// Create a new classified error. Not retryable unless opted in.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code(),
            message: message.into(),
            cause: None,
            retryable: false,
        }
    }

    /// Attach the underlying cause, preserving its message for diagnostics.
    pub fn with_cause(mut self, cause: impl fmt::Display) -> Self {
        let cause = cause.to_string();
        self.message = format!("{}: {}", self.message, cause);
        self.cause = Some(cause);
        self
    }

    /// Mark the error as retryable (rate limiting, server-side failures).
    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Classify an error surfaced by a capability boundary.
    ///
    /// Wrapping must be transparent: an already-classified error passes
    /// through with its kind and message intact; anything else collapses to
    /// `fallback`.
    pub fn wrap(err: anyhow::Error, fallback: ErrorKind) -> Self {
        match err.downcast::<ClassifiedError>() {
            Ok(classified) => classified,
            Err(other) => Self::new(fallback, other.to_string()),
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Provisioning-guard errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("Provisioning already in progress for repository '{0}'")]
    AlreadyInProgress(String),
}

/// Result type alias for git and remote operations
pub type GitResult<T> = std::result::Result<T, ClassifiedError>;
