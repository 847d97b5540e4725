//! Repository facade over `git2`.
//!
//! `LifeRepo` is the only place that talks to libgit2. It owns an optional
//! live `Repository`: the connection is stored only after a successful open
//! or init, so a failed attempt never leaves a half-built handle behind, and
//! dropping the facade releases it.

mod types;

pub use types::{CommitId, DETACHED_HEAD, FileStatus, MergeResult};

use crate::errors::RepoError;
use git2::build::CheckoutBuilder;
use git2::{
    BranchType, Commit, ErrorCode, Repository, RepositoryInitOptions, Signature, Status,
    StatusOptions,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Branch name HEAD points at in repositories created by `initialize`.
pub const INITIAL_BRANCH: &str = "main";

const FALLBACK_NAME: &str = "Life.git Learner";
const FALLBACK_EMAIL: &str = "learner@lifegit.local";

pub struct LifeRepo {
    path: PathBuf,
    repo: Option<Repository>,
}

impl LifeRepo {
    /// Attach to `path`, connecting if a repository already lives there.
    ///
    /// A missing repository is not an error; the handle simply stays
    /// disconnected until `initialize` is called.
    pub fn open(path: &Path) -> Result<Self, RepoError> {
        let repo = match Repository::open(path) {
            Ok(repo) => Some(repo),
            Err(e) if e.code() == ErrorCode::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), connected = repo.is_some(), "opened life repository");
        Ok(Self {
            path: path.to_path_buf(),
            repo,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Working directory of the live repository, or the configured path.
    pub fn workdir(&self) -> &Path {
        self.repo
            .as_ref()
            .and_then(|r| r.workdir())
            .unwrap_or(&self.path)
    }

    pub fn is_repository_present(&self) -> bool {
        self.repo.is_some()
    }

    /// Create a repository at the configured path with `main` as its unborn HEAD.
    ///
    /// Calling this on an existing repository re-runs git's init, which keeps
    /// history, branches and HEAD untouched and reconnects the handle.
    pub fn initialize(&mut self) -> Result<(), RepoError> {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(INITIAL_BRANCH);
        let repo = Repository::init_opts(&self.path, &opts)?;
        info!(path = %self.path.display(), "initialized life repository");
        self.repo = Some(repo);
        Ok(())
    }

    fn repo(&self) -> Result<&Repository, RepoError> {
        self.repo.as_ref().ok_or_else(|| RepoError::NotARepository {
            path: self.path.clone(),
        })
    }

    /// Get the HEAD commit if it exists (returns None for unborn branches)
    fn head_commit(repo: &Repository) -> Option<Commit<'_>> {
        repo.head().ok().and_then(|head| head.peel_to_commit().ok())
    }

    fn signature(repo: &Repository) -> Result<Signature<'static>, RepoError> {
        match repo.signature() {
            Ok(sig) => Ok(sig.to_owned()),
            Err(_) => Ok(Signature::now(FALLBACK_NAME, FALLBACK_EMAIL)?),
        }
    }

    fn relative_path(&self, path: &Path) -> Result<PathBuf, RepoError> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }
        let workdir = self.workdir();
        path.strip_prefix(workdir)
            .or_else(|_| path.strip_prefix(&self.path))
            .map(Path::to_path_buf)
            .map_err(|_| RepoError::PathOutsideRepository(path.to_path_buf()))
    }

    // Core operations

    /// Mark files for inclusion in the next commit.
    pub fn stage_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<(), RepoError> {
        let repo = self.repo()?;
        let mut index = repo.index()?;
        for path in paths {
            let rel = self.relative_path(path.as_ref())?;
            if self.workdir().join(&rel).exists() {
                index.add_path(&rel)?;
            } else {
                index.remove_path(&rel)?;
            }
            debug!(path = %rel.display(), "staged");
        }
        index.write()?;
        Ok(())
    }

    /// Stage `files`, then commit.
    pub fn commit_with<P: AsRef<Path>>(
        &self,
        message: &str,
        files: &[P],
    ) -> Result<CommitId, RepoError> {
        self.stage_files(files)?;
        self.commit(message)
    }

    /// Commit the index on the current branch.
    ///
    /// Fails with `NothingToCommit` when the index matches HEAD (or is empty
    /// on an unborn branch); in that case nothing is written.
    pub fn commit(&self, message: &str) -> Result<CommitId, RepoError> {
        let repo = self.repo()?;
        let mut index = repo.index()?;
        let parent = Self::head_commit(repo);

        if parent.is_none() && index.is_empty() {
            return Err(RepoError::NothingToCommit);
        }

        let tree_id = index.write_tree()?;
        if let Some(parent) = &parent
            && parent.tree_id() == tree_id
        {
            return Err(RepoError::NothingToCommit);
        }

        let tree = repo.find_tree(tree_id)?;
        let sig = Self::signature(repo)?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        info!(commit = %oid, message, "created commit");
        Ok(CommitId::new(oid))
    }

    /// Create a branch pointing at HEAD without switching to it.
    pub fn create_branch(&self, name: &str) -> Result<(), RepoError> {
        let repo = self.repo()?;
        if repo.find_branch(name, BranchType::Local).is_ok() {
            return Err(RepoError::BranchAlreadyExists(name.to_string()));
        }
        let head = Self::head_commit(repo).ok_or(RepoError::UnbornHead)?;
        repo.branch(name, &head, false)?;
        info!(branch = name, "created branch");
        Ok(())
    }

    /// Move HEAD and the working tree to `branch`.
    ///
    /// Uses a safe checkout: local modifications that would be overwritten
    /// make the checkout fail instead of being discarded.
    pub fn checkout(&self, branch: &str) -> Result<(), RepoError> {
        let repo = self.repo()?;
        let found = match repo.find_branch(branch, BranchType::Local) {
            Ok(b) => b,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(RepoError::NoSuchBranch(branch.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let reference = found.into_reference();
        let refname = reference
            .name()
            .ok_or_else(|| RepoError::NoSuchBranch(branch.to_string()))?
            .to_string();
        let tree = reference.peel_to_tree()?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        match repo.checkout_tree(tree.as_object(), Some(&mut checkout)) {
            Ok(()) => {}
            Err(e) if e.code() == ErrorCode::Conflict => {
                return Err(RepoError::CheckoutBlocked(branch.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        repo.set_head(&refname)?;

        info!(branch, "checked out branch");
        Ok(())
    }

    /// Merge `branch` into the current branch.
    ///
    /// Fast-forwards when possible, otherwise creates a merge commit. When
    /// the merge conflicts, the repository is left mid-merge and the
    /// conflicting paths are returned.
    pub fn merge(&self, branch: &str) -> Result<MergeResult, RepoError> {
        let repo = self.repo()?;
        let theirs = match repo.find_branch(branch, BranchType::Local) {
            Ok(b) => b.into_reference(),
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(RepoError::NoSuchBranch(branch.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        let annotated = repo.reference_to_annotated_commit(&theirs)?;
        let (analysis, _) = repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            debug!(branch, "merge: already up to date");
            return Ok(MergeResult::Clean);
        }

        let ours = Self::head_commit(repo).ok_or(RepoError::UnbornHead)?;
        let their_commit = repo.find_commit(annotated.id())?;

        if analysis.is_fast_forward() {
            let mut checkout = CheckoutBuilder::new();
            checkout.safe();
            repo.checkout_tree(their_commit.as_object(), Some(&mut checkout))?;
            let mut head = repo.head()?;
            head.set_target(their_commit.id(), &format!("merge {branch}: Fast-forward"))?;
            info!(branch, "merge: fast-forward");
            return Ok(MergeResult::Clean);
        }

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        repo.merge(&[&annotated], None, Some(&mut checkout))?;

        let mut index = repo.index()?;
        if index.has_conflicts() {
            let mut paths: Vec<String> = index
                .conflicts()?
                .filter_map(|c| c.ok())
                .filter_map(|c| c.our.or(c.their).or(c.ancestor))
                .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
                .collect();
            paths.sort();
            paths.dedup();
            info!(branch, conflicts = paths.len(), "merge: conflicted");
            return Ok(MergeResult::Conflicted(paths));
        }

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let sig = Self::signature(repo)?;
        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            &format!("Merge branch '{branch}'"),
            &tree,
            &[&ours, &their_commit],
        )?;
        repo.cleanup_state()?;

        info!(branch, "merge: created merge commit");
        Ok(MergeResult::Clean)
    }

    // Read-only queries

    /// Count commits reachable from `branch`.
    ///
    /// With `None` this counts the whole history: every commit reachable
    /// from any local branch or from HEAD. An empty repository counts zero.
    pub fn count_commits(&self, branch: Option<&str>) -> Result<usize, RepoError> {
        let repo = self.repo()?;
        let mut walk = repo.revwalk()?;
        match branch {
            Some(name) => match repo.find_branch(name, BranchType::Local) {
                Ok(b) => walk.push(b.get().peel_to_commit()?.id())?,
                Err(e) if e.code() == ErrorCode::NotFound => {
                    return Err(RepoError::NoSuchBranch(name.to_string()));
                }
                Err(e) => return Err(e.into()),
            },
            None => {
                let Some(head) = Self::head_commit(repo) else {
                    return Ok(0);
                };
                walk.push(head.id())?;
                walk.push_glob("refs/heads/*")?;
            }
        }

        let mut count = 0;
        for oid in walk {
            oid?;
            count += 1;
        }
        Ok(count)
    }

    pub fn has_commits(&self) -> bool {
        self.repo
            .as_ref()
            .is_some_and(|repo| Self::head_commit(repo).is_some())
    }

    /// Name of the checked-out branch; `DETACHED_HEAD` when HEAD is detached.
    ///
    /// On an unborn branch this is the branch the first commit will create.
    pub fn current_branch_name(&self) -> Result<String, RepoError> {
        let repo = self.repo()?;
        if repo.head_detached()? {
            return Ok(DETACHED_HEAD.to_string());
        }
        let head = repo.find_reference("HEAD")?;
        Ok(match head.symbolic_target() {
            Some(target) => target
                .strip_prefix("refs/heads/")
                .unwrap_or(target)
                .to_string(),
            None => DETACHED_HEAD.to_string(),
        })
    }

    /// Local branch names, sorted.
    pub fn list_branch_names(&self) -> Result<Vec<String>, RepoError> {
        let repo = self.repo()?;
        let mut names = Vec::new();
        for branch in repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn statuses(&self) -> Result<Vec<(String, Status)>, RepoError> {
        let repo = self.repo()?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        let statuses = repo.statuses(Some(&mut opts))?;
        Ok(statuses
            .iter()
            .filter_map(|entry| entry.path().map(|p| (p.to_string(), entry.status())))
            .collect())
    }

    /// Staged, unstaged, or untracked changes exist.
    pub fn has_uncommitted_changes(&self) -> Result<bool, RepoError> {
        Ok(self
            .statuses()?
            .iter()
            .any(|(_, status)| !status.is_empty() && !status.is_ignored()))
    }

    pub fn has_untracked_files(&self) -> Result<bool, RepoError> {
        Ok(!self.untracked_file_paths()?.is_empty())
    }

    pub fn untracked_file_paths(&self) -> Result<Vec<String>, RepoError> {
        Ok(self
            .statuses()?
            .into_iter()
            .filter(|(_, status)| status.is_wt_new())
            .map(|(path, _)| path)
            .collect())
    }

    pub fn staged_file_paths(&self) -> Result<Vec<String>, RepoError> {
        Ok(self
            .statuses()?
            .into_iter()
            .filter(|(_, status)| FileStatus::from_git(true, *status).staged)
            .map(|(path, _)| path)
            .collect())
    }

    /// Where one file stands: on disk, untracked, staged, modified since staging.
    pub fn file_status(&self, path: &Path) -> Result<FileStatus, RepoError> {
        let repo = self.repo()?;
        let rel = self.relative_path(path)?;
        let exists = self.workdir().join(&rel).exists();
        let status = match repo.status_file(&rel) {
            Ok(status) => status,
            Err(e) if e.code() == ErrorCode::NotFound => Status::empty(),
            Err(e) => return Err(e.into()),
        };
        Ok(FileStatus::from_git(exists, status))
    }

    pub fn has_unresolved_conflicts(&self) -> Result<bool, RepoError> {
        Ok(self.repo()?.index()?.has_conflicts())
    }

    /// Whether `path` changed in the most recent commit (false with no commits).
    pub fn is_file_in_last_commit(&self, path: &Path) -> Result<bool, RepoError> {
        let repo = self.repo()?;
        let Some(commit) = Self::head_commit(repo) else {
            return Ok(false);
        };
        let rel = self.relative_path(path)?;
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        Ok(diff.deltas().any(|delta| {
            delta.new_file().path() == Some(rel.as_path())
                || delta.old_file().path() == Some(rel.as_path())
        }))
    }

    /// Message of the HEAD commit, trimmed; empty with no commits.
    pub fn last_commit_message(&self) -> Result<String, RepoError> {
        let repo = self.repo()?;
        Ok(Self::head_commit(repo)
            .and_then(|c| c.message().map(|m| m.trim().to_string()))
            .unwrap_or_default())
    }

    /// The newest `n` HEAD reflog entries in `git reflog` format.
    pub fn recent_reflog_entries(&self, n: usize) -> Result<Vec<String>, RepoError> {
        let repo = self.repo()?;
        let reflog = match repo.reflog("HEAD") {
            Ok(reflog) => reflog,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(reflog
            .iter()
            .take(n)
            .enumerate()
            .map(|(i, entry)| {
                format!(
                    "{} HEAD@{{{}}}: {}",
                    CommitId::new(entry.id_new()).short(),
                    i,
                    entry.message().unwrap_or("")
                )
            })
            .collect())
    }

    /// Whether the tip of `source` is reachable from `target`.
    pub fn is_merged_into(&self, source: &str, target: &str) -> Result<bool, RepoError> {
        let repo = self.repo()?;
        let tip = |name: &str| -> Result<git2::Oid, RepoError> {
            match repo.find_branch(name, BranchType::Local) {
                Ok(b) => Ok(b.get().peel_to_commit()?.id()),
                Err(e) if e.code() == ErrorCode::NotFound => {
                    Err(RepoError::NoSuchBranch(name.to_string()))
                }
                Err(e) => Err(e.into()),
            }
        };
        let source_tip = tip(source)?;
        let target_tip = tip(target)?;
        if source_tip == target_tip {
            return Ok(true);
        }
        Ok(repo.graph_descendant_of(target_tip, source_tip)?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A fresh, initialized repository with a local identity configured.
    pub fn init_repo() -> (LifeRepo, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut repo = LifeRepo::open(dir.path()).unwrap();
        repo.initialize().unwrap();
        let raw = Repository::open(dir.path()).unwrap();
        let mut config = raw.config().unwrap();
        config.set_str("user.name", "test").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        (repo, dir)
    }

    pub fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    /// Write, stage and commit one file.
    pub fn commit_file(repo: &LifeRepo, name: &str, content: &str, msg: &str) -> CommitId {
        write_file(repo.path(), name, content);
        repo.commit_with(msg, &[name]).unwrap()
    }
}
