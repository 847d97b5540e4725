use crate::errors::RepoError;
use crate::repo::LifeRepo;
use crate::ui::{OutputSink, Tone};
use crate::validator;

/// Progress through the tutorial as read from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSummary {
    /// No repository, or one without commits.
    NotStarted,
    InProgress {
        current_branch: String,
        commits: usize,
        branches: Vec<String>,
        what_if_branches: usize,
    },
}

impl StatusSummary {
    pub fn collect(repo: &LifeRepo, what_if_prefix: &str) -> Result<Self, RepoError> {
        if !repo.is_repository_present() || !repo.has_commits() {
            return Ok(StatusSummary::NotStarted);
        }
        Ok(StatusSummary::InProgress {
            current_branch: repo.current_branch_name()?,
            commits: repo.count_commits(None)?,
            branches: repo.list_branch_names()?,
            what_if_branches: validator::prefixed_branches(repo, what_if_prefix).len(),
        })
    }

    pub fn render(&self, sink: &dyn OutputSink) {
        const TITLE: &str = "Your Life.git Status";
        match self {
            StatusSummary::NotStarted => sink.panel(
                TITLE,
                None,
                "No commits yet\n\nRun 'lifegit start' to begin your journey.",
                Tone::Warning,
            ),
            StatusSummary::InProgress {
                current_branch,
                commits,
                branches,
                what_if_branches,
            } => sink.panel(
                TITLE,
                None,
                &format!(
                    "Current branch:   {}\nTotal commits:    {}\nBranches:         {}\nWhat-if branches: {}",
                    current_branch,
                    commits,
                    branches.join(", "),
                    what_if_branches
                ),
                Tone::Story,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::test_support::{commit_file, init_repo};
    use crate::ui::RecordingSink;
    use tempfile::tempdir;

    #[test]
    fn test_not_started_without_repository_or_commits() {
        let dir = tempdir().unwrap();
        let repo = LifeRepo::open(dir.path()).unwrap();
        assert_eq!(
            StatusSummary::collect(&repo, "what-if-").unwrap(),
            StatusSummary::NotStarted
        );
        // collecting never creates a repository
        assert!(!dir.path().join(".git").exists());

        let (repo, _dir) = init_repo();
        assert_eq!(
            StatusSummary::collect(&repo, "what-if-").unwrap(),
            StatusSummary::NotStarted
        );
    }

    #[test]
    fn test_in_progress_counts() {
        let (repo, _dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "first");
        repo.create_branch("what-if-travel").unwrap();
        repo.create_branch("what-if-startup").unwrap();
        repo.create_branch("side-project").unwrap();

        let summary = StatusSummary::collect(&repo, "what-if-").unwrap();
        assert_eq!(
            summary,
            StatusSummary::InProgress {
                current_branch: "main".into(),
                commits: 1,
                branches: vec![
                    "main".into(),
                    "side-project".into(),
                    "what-if-startup".into(),
                    "what-if-travel".into()
                ],
                what_if_branches: 2,
            }
        );

        let sink = RecordingSink::new();
        summary.render(&sink);
        assert!(sink.contains("What-if branches: 2"));
        assert!(sink.contains("Current branch:   main"));
    }
}
