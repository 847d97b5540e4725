//! Typed error hierarchy for Life.git.
//!
//! One enum per subsystem:
//! - `RepoError`: repository facade failures
//! - `ContentError`: narrative content loading and lookup
//! - `MenuError`: malformed menus (a programming error, never learner input)
//! - `StageError`: stage lifecycle violations
//! - `TutorialError`: orchestration failures surfaced to the CLI

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the repository facade.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("No git repository at {}. Initialize one first.", path.display())]
    NotARepository { path: PathBuf },

    #[error("A branch named '{0}' already exists")]
    BranchAlreadyExists(String),

    #[error("No branch named '{0}'")]
    NoSuchBranch(String),

    #[error("Cannot switch to '{0}': local changes would be overwritten. Commit them first.")]
    CheckoutBlocked(String),

    #[error("Nothing to commit: no staged changes")]
    NothingToCommit,

    #[error("The repository has no commits yet")]
    UnbornHead,

    #[error("Path {} is outside the repository", .0.display())]
    PathOutsideRepository(PathBuf),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

impl RepoError {
    /// Failures a learner can fix by choosing a different action.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RepoError::BranchAlreadyExists(_)
                | RepoError::NoSuchBranch(_)
                | RepoError::CheckoutBlocked(_)
                | RepoError::NothingToCommit
                | RepoError::UnbornHead
        )
    }
}

/// Errors from loading or querying tutorial content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Failed to read content file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse content from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("No content defined for unit '{0}'")]
    UnknownUnit(String),

    #[error("Unit '{unit}' is missing required parameter '{key}'")]
    MissingParameter { unit: String, key: String },
}

/// Errors raised while building a menu.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MenuError {
    #[error("A menu needs at least one option")]
    Empty,

    #[error("Duplicate menu key '{0}'")]
    DuplicateKey(String),
}

/// Errors from the stage lifecycle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("Stage cannot move from {from} to {to}")]
    IllegalTransition { from: String, to: String },
}

/// Errors from the tutorial orchestrator.
#[derive(Debug, Error)]
pub enum TutorialError {
    #[error("Act must be between 1 and {max} (got {ordinal})")]
    UnknownStage { ordinal: u8, max: u8 },

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Content(#[from] ContentError),

}
