//! Baseline repository state captured when a stage begins.

use crate::errors::RepoError;
use crate::repo::LifeRepo;

/// What the repository looked like at stage entry.
///
/// Captured once and never mutated; validation compares against it to tell
/// learner progress apart from work done in earlier stages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageSnapshot {
    commits: usize,
    branches: Vec<String>,
    current_branch: Option<String>,
}

impl StageSnapshot {
    /// Read the baseline from `repo`. A disconnected repository is all zeros.
    pub fn capture(repo: &LifeRepo) -> Result<Self, RepoError> {
        if !repo.is_repository_present() {
            return Ok(Self::default());
        }
        let current_branch = if repo.has_commits() {
            Some(repo.current_branch_name()?)
        } else {
            None
        };
        Ok(Self {
            commits: repo.count_commits(None)?,
            branches: repo.list_branch_names()?,
            current_branch,
        })
    }

    /// Same snapshot with the commit baseline replaced. Used when a stage is
    /// checked after the fact and its entry state has to be reconstructed.
    pub fn with_commits(mut self, commits: usize) -> Self {
        self.commits = commits;
        self
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn current_branch(&self) -> Option<&str> {
        self.current_branch.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::test_support::{commit_file, init_repo};
    use tempfile::tempdir;

    #[test]
    fn test_capture_without_repository() {
        let dir = tempdir().unwrap();
        let repo = LifeRepo::open(dir.path()).unwrap();
        let snapshot = StageSnapshot::capture(&repo).unwrap();
        assert_eq!(snapshot, StageSnapshot::default());
        assert_eq!(snapshot.current_branch(), None);
    }

    #[test]
    fn test_capture_unborn_repository() {
        let (repo, _dir) = init_repo();
        let snapshot = StageSnapshot::capture(&repo).unwrap();
        assert_eq!(snapshot.commits(), 0);
        assert!(snapshot.branches().is_empty());
        assert_eq!(snapshot.current_branch(), None);
    }

    #[test]
    fn test_capture_is_not_affected_by_later_commits() {
        let (repo, _dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        let snapshot = StageSnapshot::capture(&repo).unwrap();

        repo.create_branch("what-if-travel").unwrap();
        commit_file(&repo, "more.txt", "more", "second");

        assert_eq!(snapshot.commits(), 1);
        assert_eq!(snapshot.branches(), ["main".to_string()]);
        assert_eq!(snapshot.current_branch(), Some("main"));
    }

    #[test]
    fn test_with_commits_keeps_branches() {
        let (repo, _dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        let snapshot = StageSnapshot::capture(&repo).unwrap().with_commits(0);
        assert_eq!(snapshot.commits(), 0);
        assert_eq!(snapshot.branches(), ["main".to_string()]);
    }
}
