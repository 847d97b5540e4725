//! Value types returned by the repository facade.

use std::fmt;

/// Branch name reported while HEAD points directly at a commit.
pub const DETACHED_HEAD: &str = "(detached HEAD)";

/// Identifier of a commit created through the facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitId(git2::Oid);

impl CommitId {
    pub(crate) fn new(oid: git2::Oid) -> Self {
        Self(oid)
    }

    /// Seven-character abbreviation, as `git log --oneline` prints it.
    pub fn short(&self) -> String {
        let full = self.0.to_string();
        full[..7.min(full.len())].to_string()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of merging a branch into the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeResult {
    Clean,
    /// The merge stopped; the listed paths carry unmerged entries.
    Conflicted(Vec<String>),
}

impl MergeResult {
    pub fn is_clean(&self) -> bool {
        matches!(self, MergeResult::Clean)
    }
}

/// Where a single file stands relative to the index and HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStatus {
    pub exists: bool,
    pub untracked: bool,
    pub staged: bool,
    /// Working-tree content differs from what is in the index.
    pub unstaged: bool,
    pub conflicted: bool,
}

impl FileStatus {
    pub(crate) fn from_git(exists: bool, status: git2::Status) -> Self {
        Self {
            exists,
            untracked: status.is_wt_new(),
            staged: status.intersects(
                git2::Status::INDEX_NEW
                    | git2::Status::INDEX_MODIFIED
                    | git2::Status::INDEX_DELETED
                    | git2::Status::INDEX_RENAMED
                    | git2::Status::INDEX_TYPECHANGE,
            ),
            unstaged: status.intersects(
                git2::Status::WT_MODIFIED
                    | git2::Status::WT_DELETED
                    | git2::Status::WT_RENAMED
                    | git2::Status::WT_TYPECHANGE,
            ),
            conflicted: status.is_conflicted(),
        }
    }

    /// Staged and nothing left in the working tree.
    pub fn ready_to_commit(&self) -> bool {
        self.staged && !self.unstaged && !self.untracked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_commit_id_is_seven_chars() {
        let oid = git2::Oid::from_str("0123456789abcdef0123456789abcdef01234567").unwrap();
        let id = CommitId::new(oid);
        assert_eq!(id.short(), "0123456");
        assert_eq!(id.to_string().len(), 40);
    }

    #[test]
    fn file_status_classifies_index_and_worktree_bits() {
        let status = FileStatus::from_git(true, git2::Status::INDEX_NEW | git2::Status::WT_MODIFIED);
        assert!(status.staged);
        assert!(status.unstaged);
        assert!(!status.untracked);
        assert!(!status.ready_to_commit());

        let untracked = FileStatus::from_git(true, git2::Status::WT_NEW);
        assert!(untracked.untracked);
        assert!(!untracked.staged);

        let ready = FileStatus::from_git(true, git2::Status::INDEX_MODIFIED);
        assert!(ready.ready_to_commit());
    }

    #[test]
    fn merge_result_clean_flag() {
        assert!(MergeResult::Clean.is_clean());
        assert!(!MergeResult::Conflicted(vec!["a.txt".into()]).is_clean());
    }
}
