//! Completion predicates for tutorial exercises.
//!
//! Every predicate is total: a repository error or a missing precondition
//! yields `false`, never an `Err` or a panic. Errors are logged at debug
//! level so `--verbose` runs can still explain a failing check.

use crate::errors::RepoError;
use crate::repo::LifeRepo;
use crate::snapshot::StageSnapshot;
use std::path::Path;
use tracing::debug;

/// Branch names accepted as "your actual path".
pub const DEFAULT_MAIN_BRANCHES: [&str; 2] = ["main", "master"];

fn holds(check: &str, result: Result<bool, RepoError>) -> bool {
    result.unwrap_or_else(|e| {
        debug!(check, error = %e, "predicate treated as unmet");
        false
    })
}

/// File exists in the working directory.
pub fn file_exists(repo: &LifeRepo, file_name: &str) -> bool {
    repo.workdir().join(file_name).exists()
}

/// File exists and changed in the most recent commit.
pub fn file_exists_and_committed(repo: &LifeRepo, file_name: &str) -> bool {
    file_exists(repo, file_name)
        && holds(
            "file_in_last_commit",
            repo.is_file_in_last_commit(Path::new(file_name)),
        )
}

pub fn branch_exists(repo: &LifeRepo, branch: &str) -> bool {
    holds(
        "branch_exists",
        repo.list_branch_names()
            .map(|names| names.iter().any(|n| n == branch)),
    )
}

pub fn on_branch(repo: &LifeRepo, branch: &str) -> bool {
    holds(
        "on_branch",
        repo.current_branch_name().map(|current| current == branch),
    )
}

pub fn on_any_branch<S: AsRef<str>>(repo: &LifeRepo, branches: &[S]) -> bool {
    holds(
        "on_any_branch",
        repo.current_branch_name()
            .map(|current| branches.iter().any(|b| b.as_ref() == current)),
    )
}

pub fn has_commits(repo: &LifeRepo, minimum: usize) -> bool {
    holds(
        "has_commits",
        repo.count_commits(None).map(|count| count >= minimum),
    )
}

/// The repository history grew since the stage began.
pub fn made_progress(repo: &LifeRepo, snapshot: &StageSnapshot) -> bool {
    holds(
        "made_progress",
        repo.count_commits(None)
            .map(|count| count > snapshot.commits()),
    )
}

/// Tip of `source` is part of `target`'s history.
pub fn branches_merged(repo: &LifeRepo, source: &str, target: &str) -> bool {
    holds("branches_merged", repo.is_merged_into(source, target))
}

/// No unmerged entries and a clean working tree.
pub fn conflict_resolved(repo: &LifeRepo) -> bool {
    holds(
        "conflict_resolved",
        repo.has_unresolved_conflicts().and_then(|conflicted| {
            Ok(!conflicted && !repo.has_uncommitted_changes()?)
        }),
    )
}

/// Local branches whose names start with `prefix`.
pub fn prefixed_branches(repo: &LifeRepo, prefix: &str) -> Vec<String> {
    repo.list_branch_names()
        .map(|names| {
            names
                .into_iter()
                .filter(|name| name.starts_with(prefix))
                .collect()
        })
        .unwrap_or_default()
}

/// Commit basics: repository present, file on disk, a new commit since the
/// snapshot, and that commit touched the file.
pub fn first_decision_complete(
    repo: &LifeRepo,
    snapshot: &StageSnapshot,
    file_name: &str,
) -> bool {
    repo.is_repository_present()
        && file_exists(repo, file_name)
        && made_progress(repo, snapshot)
        && file_exists_and_committed(repo, file_name)
}

/// Branching: a prefixed branch exists, a new commit since the snapshot,
/// and HEAD is back on a main branch.
pub fn what_if_complete<S: AsRef<str>>(
    repo: &LifeRepo,
    snapshot: &StageSnapshot,
    prefix: &str,
    main_branches: &[S],
) -> bool {
    repo.is_repository_present()
        && !prefixed_branches(repo, prefix).is_empty()
        && made_progress(repo, snapshot)
        && on_any_branch(repo, main_branches)
}

/// Whether some what-if branch carries more commits than the current main
/// branch. `None` when the comparison cannot be made.
///
/// Only an extra signal; `what_if_complete` does not depend on it.
pub fn what_if_branch_ahead<S: AsRef<str>>(
    repo: &LifeRepo,
    prefix: &str,
    main_branches: &[S],
) -> Option<bool> {
    let current = repo.current_branch_name().ok()?;
    if !main_branches.iter().any(|b| b.as_ref() == current) {
        return None;
    }
    let main_count = repo.count_commits(Some(&current)).ok()?;
    let branches = prefixed_branches(repo, prefix);
    if branches.is_empty() {
        return None;
    }
    let mut compared = false;
    for branch in branches {
        if let Ok(count) = repo.count_commits(Some(&branch)) {
            compared = true;
            if count > main_count {
                return Some(true);
            }
        }
    }
    compared.then_some(false)
}
