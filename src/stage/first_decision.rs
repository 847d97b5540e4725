//! Act 1: make a decision and commit it.

use super::{
    Hint, Stage, StageRun, StageSettings, Unit, branch_lines, hint_option, offer_hint, show_status,
};
use crate::content::UnitContent;
use crate::errors::{ContentError, RepoError};
use crate::interaction::{Driver, MenuOption};
use crate::repo::LifeRepo;
use crate::snapshot::StageSnapshot;
use crate::ui::{OutputSink, Tone};
use crate::validator;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

const DEFAULT_COMMIT_MESSAGE: &str = "My first decision";

/// Where a learner stands in act 1, the most basic gap first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DecisionStep {
    InitRepository,
    CreateFile,
    StageFile,
    StageChanges,
    Commit,
    CheckStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Init,
    Where,
    Add,
    Status,
    Commit,
    Hint,
}

pub struct FirstDecision<'r> {
    repo: &'r mut LifeRepo,
    content: &'r UnitContent,
    snapshot: StageSnapshot,
    file_name: String,
    commit_message: String,
    advanced: bool,
}

impl<'r> FirstDecision<'r> {
    pub const REQUIRED_PARAMETERS: &'static [&'static str] = &["file_name"];

    pub fn new(
        repo: &'r mut LifeRepo,
        content: &'r UnitContent,
        snapshot: StageSnapshot,
        settings: &StageSettings,
    ) -> Result<Self, ContentError> {
        let prompts = &content.prompts;
        let file_name = prompts
            .require_str(Unit::FirstDecision.key(), "file_name")?
            .to_string();
        let commit_message = prompts
            .param_str_or("commit_message", DEFAULT_COMMIT_MESSAGE)
            .to_string();
        Ok(Self {
            repo,
            content,
            snapshot,
            file_name,
            commit_message,
            advanced: settings.advanced,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// First unmet precondition, judged from the file's own status.
    pub fn diagnose(&self) -> DecisionStep {
        let repo = &*self.repo;
        if !repo.is_repository_present() {
            return DecisionStep::InitRepository;
        }
        if !validator::file_exists(repo, &self.file_name) {
            return DecisionStep::CreateFile;
        }
        match repo.file_status(Path::new(&self.file_name)) {
            Ok(status) if status.untracked => DecisionStep::StageFile,
            Ok(status) if status.unstaged => DecisionStep::StageChanges,
            Ok(status) if status.ready_to_commit() => DecisionStep::Commit,
            Ok(_) => DecisionStep::CheckStatus,
            Err(e) => {
                debug!(error = %e, "file status unavailable for hint");
                DecisionStep::CheckStatus
            }
        }
    }

    fn ensure_repository(&mut self, driver: &mut Driver<'_>, run: &mut StageRun) -> Result<()> {
        if self.repo.is_repository_present() {
            debug!("life repository already present");
            return Ok(());
        }

        let options = [
            MenuOption::new("1", "git init", "Begin your life story", Action::Init),
            MenuOption::new("2", "pwd", "See where it will be recorded", Action::Where),
            hint_option(Action::Hint),
        ];
        loop {
            match driver.present_menu(&options, "Every story needs a beginning. Start your repository?")? {
                Action::Init => {
                    self.repo
                        .initialize()
                        .context("Failed to initialize the life repository")?;
                    driver.report_command_outcome(
                        "git init",
                        true,
                        Some(&format!(
                            "Initialized empty Git repository in {}",
                            self.repo.workdir().display()
                        )),
                    );
                    return Ok(());
                }
                Action::Hint => offer_hint(&*self, driver, run)?,
                _ => {
                    let sink = driver.sink();
                    sink.line("$ pwd", Tone::Command);
                    sink.line(&self.repo.path().display().to_string(), Tone::Plain);
                }
            }
        }
    }

    fn stage_decision(&self, driver: &mut Driver<'_>) -> Result<bool> {
        let command = format!("git add {}", self.file_name);
        match self.repo.stage_files(&[&self.file_name]) {
            Ok(()) => {
                driver.report_command_outcome(&command, true, None);
                Ok(true)
            }
            Err(e) if e.is_recoverable() => {
                driver.report_command_outcome(&command, false, Some(&e.to_string()));
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn stage_step(&self, driver: &mut Driver<'_>, run: &mut StageRun) -> Result<()> {
        let options = [
            MenuOption::new(
                "1",
                format!("git add {}", self.file_name),
                "Consider this option seriously",
                Action::Add,
            ),
            MenuOption::new("2", "git status", "See where you are", Action::Status),
            hint_option(Action::Hint),
        ];
        loop {
            match driver.present_menu(&options, "Stage your decision?")? {
                Action::Add => {
                    if self.stage_decision(driver)? {
                        return Ok(());
                    }
                }
                Action::Hint => offer_hint(self, driver, run)?,
                _ => show_status(self.repo, driver.sink()),
            }
        }
    }

    fn commit_step(&self, driver: &mut Driver<'_>, run: &mut StageRun) -> Result<()> {
        let options = [
            MenuOption::new("1", "git commit", "Make it permanent", Action::Commit),
            MenuOption::new("2", "git status", "See what's staged", Action::Status),
            MenuOption::new(
                "3",
                format!("git add {}", self.file_name),
                "Stage your latest edits",
                Action::Add,
            ),
            hint_option(Action::Hint),
        ];
        loop {
            match driver.present_menu(&options, "Commit to your decision?")? {
                Action::Commit => {
                    let message = driver
                        .prompt_for_text("Describe your decision", Some(&self.commit_message))?;
                    let command = format!("git commit -m \"{message}\"");
                    match self.repo.commit(&message) {
                        Ok(id) => {
                            let branch = self
                                .repo
                                .current_branch_name()
                                .unwrap_or_else(|_| "HEAD".to_string());
                            driver.report_command_outcome(
                                &command,
                                true,
                                Some(&format!("[{} {}] {}", branch, id.short(), message)),
                            );
                            return Ok(());
                        }
                        Err(e @ RepoError::NothingToCommit) => {
                            driver.report_command_outcome(&command, false, Some(&e.to_string()));
                            driver.sink().line(
                                &format!(
                                    "Edit {} if you already committed it, then stage it again.",
                                    self.file_name
                                ),
                                Tone::Hint,
                            );
                        }
                        Err(e) if e.is_recoverable() => {
                            driver.report_command_outcome(&command, false, Some(&e.to_string()));
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Action::Add => {
                    self.stage_decision(driver)?;
                }
                Action::Hint => offer_hint(self, driver, run)?,
                _ => show_status(self.repo, driver.sink()),
            }
        }
    }
}

impl Stage for FirstDecision<'_> {
    fn unit(&self) -> Unit {
        Unit::FirstDecision
    }

    fn content(&self) -> &UnitContent {
        self.content
    }

    fn is_advanced(&self) -> bool {
        self.advanced
    }

    fn run_guided(&mut self, driver: &mut Driver<'_>, run: &mut StageRun) -> Result<()> {
        self.ensure_repository(driver, run)?;

        let path = self.repo.workdir().join(&self.file_name);
        driver.wait_for_file_creation(
            &path,
            Some(&format!(
                "Create a file called '{}' and write your decision inside.\n\n\
                 What did you choose? University? Work? Travel? Something else entirely?\n\
                 Use any editor, or: echo \"University\" > {}",
                self.file_name, self.file_name
            )),
        )?;

        driver.sink().blank();
        driver.sink().line(
            "The decision exists, but only in your working directory. Nothing is settled yet.",
            Tone::Muted,
        );
        self.stage_step(driver, run)?;
        self.commit_step(driver, run)
    }

    fn validate(&self) -> bool {
        validator::first_decision_complete(self.repo, &self.snapshot, &self.file_name)
    }

    fn hint(&self) -> Hint {
        let file = &self.file_name;
        match self.diagnose() {
            DecisionStep::InitRepository => {
                Hint::new("There is no repository here yet. Start one.").with_command("git init")
            }
            DecisionStep::CreateFile => Hint::new(format!("First, create the file '{file}'"))
                .with_command(format!("echo 'My decision: ...' > {file}")),
            DecisionStep::StageFile => Hint::new("Your file exists but isn't staged yet")
                .with_command(format!("git add {file}")),
            DecisionStep::StageChanges => {
                Hint::new("Your file has changes that aren't staged yet")
                    .with_command(format!("git add {file}"))
            }
            DecisionStep::Commit => Hint::new("Your file is staged. Now commit it!")
                .with_command(format!("git commit -m '{}'", self.commit_message)),
            DecisionStep::CheckStatus => {
                Hint::new("Check your status to see where you are").with_command("git status")
            }
        }
    }

    fn summarize(&self, sink: &dyn OutputSink) {
        let repo = &*self.repo;
        sink.blank();
        sink.line("Your history:", Tone::Story);
        match (repo.count_commits(None), repo.last_commit_message()) {
            (Ok(count), Ok(message)) => {
                sink.line(
                    &format!("  {} commit(s), latest: \"{}\"", count, message.trim()),
                    Tone::Plain,
                );
            }
            (Err(e), _) | (_, Err(e)) => debug!(error = %e, "history summary unavailable"),
        }
        if let Ok(lines) = branch_lines(repo) {
            for line in lines {
                sink.line(&format!("  {line}"), Tone::Plain);
            }
        }
    }
}
