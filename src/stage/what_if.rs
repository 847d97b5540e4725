//! Act 2: explore an alternate timeline on a branch.

use super::{
    Hint, Stage, StageRun, StageSettings, Unit, branch_lines, hint_option, offer_hint,
    show_branches, show_status,
};
use crate::content::UnitContent;
use crate::errors::{ContentError, RepoError};
use crate::interaction::{Driver, MenuOption};
use crate::repo::{INITIAL_BRANCH, LifeRepo};
use crate::snapshot::StageSnapshot;
use crate::ui::{OutputSink, Tone};
use crate::validator;
use anyhow::Result;
use tracing::debug;

const DEFAULT_ALTERNATIVE: &str = "travel";

/// Where a learner stands in act 2, the most basic gap first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WhatIfStep {
    CreateBranch,
    SwitchToBranch,
    CommitOnBranch,
    ReturnToMain,
    LooksGood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Branch,
    List,
    Checkout,
    Add,
    Status,
    Commit,
    Hint,
}

/// Turn free text into the part of a branch name after the prefix.
///
/// Lowercases, joins words with `-`, drops anything git would reject or a
/// learner would trip over. A leading copy of the prefix is removed,
/// whatever its case.
pub fn timeline_slug(input: &str, prefix: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let prefix = prefix.to_lowercase();
    let trimmed = lowered.strip_prefix(prefix.as_str()).unwrap_or(&lowered);
    let mut slug = String::new();
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_')
            && !slug.is_empty()
            && !slug.ends_with('-')
        {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

pub struct WhatIf<'r> {
    repo: &'r LifeRepo,
    content: &'r UnitContent,
    snapshot: StageSnapshot,
    prefix: String,
    default_alternative: String,
    main_branches: Vec<String>,
    advanced: bool,
}

impl<'r> WhatIf<'r> {
    pub const REQUIRED_PARAMETERS: &'static [&'static str] = &["branch_prefix"];

    pub fn new(
        repo: &'r LifeRepo,
        content: &'r UnitContent,
        snapshot: StageSnapshot,
        settings: &StageSettings,
    ) -> Result<Self, ContentError> {
        let prompts = &content.prompts;
        let prefix = match &settings.what_if_prefix {
            Some(prefix) => prefix.clone(),
            None => prompts
                .require_str(Unit::WhatIf.key(), "branch_prefix")?
                .to_string(),
        };
        let default_alternative = prompts
            .param_str_or("default_alternative", DEFAULT_ALTERNATIVE)
            .to_string();
        Ok(Self {
            repo,
            content,
            snapshot,
            prefix,
            default_alternative,
            main_branches: settings.main_branches.clone(),
            advanced: settings.advanced,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The branch to return to: the first configured main branch that
    /// exists, else the branch the act started on, else `main`.
    fn main_branch(&self) -> String {
        let existing = self.repo.list_branch_names().unwrap_or_default();
        if let Some(main) = self.main_branches.iter().find(|b| existing.contains(b)) {
            return main.clone();
        }
        if let Some(entry) = self.snapshot.current_branch()
            && !entry.starts_with(&self.prefix)
            && existing.iter().any(|b| b == entry)
        {
            return entry.to_string();
        }
        INITIAL_BRANCH.to_string()
    }

    /// First unmet precondition.
    pub fn diagnose(&self) -> WhatIfStep {
        let repo = self.repo;
        if validator::prefixed_branches(repo, &self.prefix).is_empty() {
            return WhatIfStep::CreateBranch;
        }
        let progressed = validator::made_progress(repo, &self.snapshot);
        let current = repo.current_branch_name().unwrap_or_default();
        if current.starts_with(&self.prefix) {
            return if progressed {
                WhatIfStep::ReturnToMain
            } else {
                WhatIfStep::CommitOnBranch
            };
        }
        if !progressed {
            WhatIfStep::SwitchToBranch
        } else if !validator::on_any_branch(repo, &self.main_branches) {
            WhatIfStep::ReturnToMain
        } else {
            WhatIfStep::LooksGood
        }
    }

    fn create_branch_step(
        &self,
        driver: &mut Driver<'_>,
        run: &mut StageRun,
        branch: &str,
    ) -> Result<()> {
        let command = format!("git branch {branch}");
        let options = [
            MenuOption::new("1", command.clone(), "Create the alternate timeline", Action::Branch),
            MenuOption::new("2", "git branch", "See existing branches", Action::List),
            hint_option(Action::Hint),
        ];
        loop {
            match driver.present_menu(&options, "Ready to create your 'what if' timeline?")? {
                Action::Branch => match self.repo.create_branch(branch) {
                    Ok(()) => {
                        driver.report_command_outcome(
                            &command,
                            true,
                            Some(&format!("Branch '{branch}' created")),
                        );
                        return Ok(());
                    }
                    Err(e @ RepoError::BranchAlreadyExists(_)) => {
                        driver.report_command_outcome(&command, false, Some(&e.to_string()));
                        driver
                            .sink()
                            .line("That timeline is already there. You can step into it.", Tone::Hint);
                        return Ok(());
                    }
                    Err(e @ RepoError::UnbornHead) => {
                        driver.report_command_outcome(&command, false, Some(&e.to_string()));
                        driver.sink().line(
                            "A branch needs a commit to start from. Commit your first decision, then try again.",
                            Tone::Hint,
                        );
                    }
                    Err(e) if e.is_recoverable() => {
                        driver.report_command_outcome(&command, false, Some(&e.to_string()));
                    }
                    Err(e) => return Err(e.into()),
                },
                Action::Hint => offer_hint(self, driver, run)?,
                _ => show_branches(self.repo, driver.sink()),
            }
        }
    }

    fn checkout_step(
        &self,
        driver: &mut Driver<'_>,
        run: &mut StageRun,
        branch: &str,
        description: &str,
        prompt: &str,
    ) -> Result<()> {
        let command = format!("git checkout {branch}");
        let options = [
            MenuOption::new("1", command.clone(), description, Action::Checkout),
            MenuOption::new("2", "git branch", "See where you are", Action::List),
            hint_option(Action::Hint),
        ];
        loop {
            match driver.present_menu(&options, prompt)? {
                Action::Checkout => match self.repo.checkout(branch) {
                    Ok(()) => {
                        driver.report_command_outcome(
                            &command,
                            true,
                            Some(&format!("Switched to branch '{branch}'")),
                        );
                        return Ok(());
                    }
                    Err(e) if e.is_recoverable() => {
                        driver.report_command_outcome(&command, false, Some(&e.to_string()));
                    }
                    Err(e) => return Err(e.into()),
                },
                Action::Hint => offer_hint(self, driver, run)?,
                _ => show_branches(self.repo, driver.sink()),
            }
        }
    }

    fn stage_step(&self, driver: &mut Driver<'_>, run: &mut StageRun, file_name: &str) -> Result<()> {
        let command = format!("git add {file_name}");
        let options = [
            MenuOption::new("1", command.clone(), "Stage your alternate life", Action::Add),
            MenuOption::new("2", "git status", "See current state", Action::Status),
            hint_option(Action::Hint),
        ];
        loop {
            match driver.present_menu(&options, "Stage your changes?")? {
                Action::Add => match self.repo.stage_files(&[file_name]) {
                    Ok(()) => {
                        driver.report_command_outcome(&command, true, None);
                        return Ok(());
                    }
                    Err(e) if e.is_recoverable() => {
                        driver.report_command_outcome(&command, false, Some(&e.to_string()));
                    }
                    Err(e) => return Err(e.into()),
                },
                Action::Hint => offer_hint(self, driver, run)?,
                _ => show_status(self.repo, driver.sink()),
            }
        }
    }

    fn commit_step(
        &self,
        driver: &mut Driver<'_>,
        run: &mut StageRun,
        alternative: &str,
        file_name: &str,
    ) -> Result<()> {
        let options = [
            MenuOption::new("1", "git commit", "Save this alternate timeline", Action::Commit),
            MenuOption::new("2", "git status", "See what's staged", Action::Status),
            MenuOption::new(
                "3",
                format!("git add {file_name}"),
                "Stage your latest edits",
                Action::Add,
            ),
            hint_option(Action::Hint),
        ];
        let default_message = format!("What if I'd chosen {alternative}?");
        loop {
            match driver.present_menu(&options, "Commit to this alternate reality?")? {
                Action::Commit => {
                    let message =
                        driver.prompt_for_text("Describe this alternate path", Some(&default_message))?;
                    let command = format!("git commit -m \"{message}\"");
                    match self.repo.commit(&message) {
                        Ok(id) => {
                            driver.report_command_outcome(
                                &command,
                                true,
                                Some(&format!("[{}] {}", id.short(), message)),
                            );
                            return Ok(());
                        }
                        Err(e @ RepoError::NothingToCommit) => {
                            driver.report_command_outcome(&command, false, Some(&e.to_string()));
                            driver.sink().line(
                                &format!(
                                    "Edit {file_name} if you already committed it, then stage it again."
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
                    let command = format!("git add {file_name}");
                    match self.repo.stage_files(&[file_name]) {
                        Ok(()) => driver.report_command_outcome(&command, true, None),
                        Err(e) if e.is_recoverable() => {
                            driver.report_command_outcome(&command, false, Some(&e.to_string()))
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Action::Hint => offer_hint(self, driver, run)?,
                _ => show_status(self.repo, driver.sink()),
            }
        }
    }
}

impl Stage for WhatIf<'_> {
    fn unit(&self) -> Unit {
        Unit::WhatIf
    }

    fn content(&self) -> &UnitContent {
        self.content
    }

    fn is_advanced(&self) -> bool {
        self.advanced
    }

    fn run_guided(&mut self, driver: &mut Driver<'_>, run: &mut StageRun) -> Result<()> {
        driver.sink().blank();
        driver.sink().panel(
            "What if?",
            None,
            "Think of a path you didn't take. A 'what if?' that still crosses your mind.\n\n\
             What if you'd traveled instead? Started that company? Moved abroad?\n\
             Stayed home? Taken that other job?",
            Tone::Task,
        );
        let answer = driver.prompt_for_text(
            &format!(
                "Name your alternate timeline (will be prefixed with '{}')",
                self.prefix
            ),
            Some(&self.default_alternative),
        )?;
        let mut alternative = timeline_slug(&answer, &self.prefix);
        if alternative.is_empty() {
            alternative = timeline_slug(&self.default_alternative, &self.prefix);
        }
        let branch = format!("{}{}", self.prefix, alternative);
        debug!(branch = %branch, "chosen what-if branch");

        self.create_branch_step(driver, run, &branch)?;

        driver.sink().blank();
        driver.sink().line(
            "The branch exists, but you're still on your main timeline. Let's step into the alternate reality.",
            Tone::Muted,
        );
        self.checkout_step(
            driver,
            run,
            &branch,
            "Step into the alternate timeline",
            "Ready to explore the road not taken?",
        )?;

        let file_name = format!("{alternative}-life.txt");
        driver.wait_for_file_creation(
            &self.repo.workdir().join(&file_name),
            Some(&format!(
                "Create a file called '{file_name}' describing this alternate life.\n\n\
                 What would your life look like if you'd taken this path?\n\
                 Write a few lines about this alternate version of yourself."
            )),
        )?;

        driver.sink().blank();
        driver.sink().line(
            "Time to commit this alternate reality to its own timeline.",
            Tone::Muted,
        );
        self.stage_step(driver, run, &file_name)?;
        self.commit_step(driver, run, &alternative, &file_name)?;

        driver.sink().blank();
        driver.sink().line(
            "You've explored the alternate timeline. Now let's return to your actual path.",
            Tone::Muted,
        );
        let main = self.main_branch();
        self.checkout_step(
            driver,
            run,
            &main,
            "Return to your actual timeline",
            "Ready to return to reality?",
        )
    }

    fn validate(&self) -> bool {
        validator::what_if_complete(self.repo, &self.snapshot, &self.prefix, &self.main_branches)
    }

    fn hint(&self) -> Hint {
        let prefix = &self.prefix;
        match self.diagnose() {
            WhatIfStep::CreateBranch => {
                let example = format!("{prefix}{}", self.default_alternative);
                Hint::new("Create a 'what-if' branch first")
                    .with_command(format!("git branch {example}"))
                    .with_command(format!("git checkout {example}"))
            }
            WhatIfStep::SwitchToBranch => {
                let branch = validator::prefixed_branches(self.repo, prefix)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| format!("{prefix}{}", self.default_alternative));
                Hint::new("Your timeline exists. Step into it before committing")
                    .with_command(format!("git checkout {branch}"))
            }
            WhatIfStep::CommitOnBranch => Hint::new("Create a file and commit on this branch")
                .with_command("echo 'In this timeline...' > alternate.txt")
                .with_command("git add alternate.txt && git commit -m 'What if...'"),
            WhatIfStep::ReturnToMain => Hint::new("Return to your main timeline")
                .with_command(format!("git checkout {}", self.main_branch())),
            WhatIfStep::LooksGood => {
                Hint::new("Looks good! Make sure you committed on your what-if branch.")
            }
        }
    }

    fn summarize(&self, sink: &dyn OutputSink) {
        sink.blank();
        sink.line("Your branches:", Tone::Story);
        match branch_lines(self.repo) {
            Ok(lines) => {
                for line in lines {
                    sink.line(&format!("  {line}"), Tone::Plain);
                }
            }
            Err(e) => debug!(error = %e, "branch summary unavailable"),
        }
        if validator::what_if_branch_ahead(self.repo, &self.prefix, &self.main_branches)
            == Some(false)
        {
            sink.line(
                "Your new commit landed on your main timeline, not on a what-if branch.",
                Tone::Warning,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::interaction::ScriptedInteraction;
    use crate::repo::test_support::{commit_file, init_repo, write_file};
    use crate::stage::{StageState, run_stage};
    use crate::ui::RecordingSink;

    fn stage<'r>(repo: &'r LifeRepo, content: &'r Content) -> WhatIf<'r> {
        let snapshot = StageSnapshot::capture(repo).unwrap();
        WhatIf::new(
            repo,
            content.unit("act2").unwrap(),
            snapshot,
            &StageSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_timeline_slug() {
        assert_eq!(timeline_slug("travel", "what-if-"), "travel");
        assert_eq!(timeline_slug("  Stayed Home ", "what-if-"), "stayed-home");
        assert_eq!(timeline_slug("what-if-startup", "what-if-"), "startup");
        assert_eq!(timeline_slug("art_school!", "what-if-"), "art-school");
        assert_eq!(timeline_slug("--moved  abroad--", "what-if-"), "moved-abroad");
        assert_eq!(timeline_slug("???", "what-if-"), "");
        assert_eq!(timeline_slug("What-If-Travel", "what-if-"), "travel");
        assert_eq!(timeline_slug("ALT-startup", "alt-"), "startup");
    }

    #[test]
    fn test_hint_progression() {
        let (repo, dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        let content = Content::embedded().unwrap();
        let stage = stage(&repo, &content);

        assert_eq!(stage.diagnose(), WhatIfStep::CreateBranch);
        assert!(
            stage
                .hint()
                .commands
                .contains(&"git branch what-if-travel".to_string())
        );

        repo.create_branch("what-if-travel").unwrap();
        assert_eq!(stage.diagnose(), WhatIfStep::SwitchToBranch);

        repo.checkout("what-if-travel").unwrap();
        assert_eq!(stage.diagnose(), WhatIfStep::CommitOnBranch);

        write_file(dir.path(), "travel-life.txt", "Backpacking");
        repo.stage_files(&["travel-life.txt"]).unwrap();
        repo.commit("What if I'd chosen travel?").unwrap();
        assert_eq!(stage.diagnose(), WhatIfStep::ReturnToMain);
        assert_eq!(
            stage.hint().commands,
            vec!["git checkout main".to_string()]
        );
        assert!(!stage.validate());

        repo.checkout("main").unwrap();
        assert_eq!(stage.diagnose(), WhatIfStep::LooksGood);
        assert!(stage.validate());
    }

    #[test]
    fn test_prefix_override_from_settings() {
        let (repo, _dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "first");
        let content = Content::embedded().unwrap();
        let settings = StageSettings {
            what_if_prefix: Some("alt-".into()),
            ..StageSettings::default()
        };
        let stage = WhatIf::new(
            &repo,
            content.unit("act2").unwrap(),
            StageSnapshot::capture(&repo).unwrap(),
            &settings,
        )
        .unwrap();
        assert_eq!(stage.prefix(), "alt-");
    }

    #[test]
    fn test_guided_run_follows_the_original_timeline() {
        let (repo, dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        let content = Content::embedded().unwrap();
        let mut stage = stage(&repo, &content);

        // name, list, branch, checkout, add, commit (default message), back to main
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["Stayed Home", "2", "1", "1", "1", "1", "", "1"]);
        write_file(dir.path(), "stayed-home-life.txt", "Closer to family");
        let run = {
            let mut driver = Driver::new(&sink, &mut input);
            run_stage(&mut stage, &mut driver).unwrap()
        };

        assert_eq!(run.state(), StageState::Concluded);
        assert_eq!(input.remaining(), 0);
        assert_eq!(repo.current_branch_name().unwrap(), "main");
        assert_eq!(repo.count_commits(Some("what-if-stayed-home")).unwrap(), 2);
        assert_eq!(repo.count_commits(Some("main")).unwrap(), 1);
        assert!(sink.contains("Branch 'what-if-stayed-home' created"));
        assert!(sink.contains("Switched to branch 'main'"));
        assert!(sink.contains("What if I'd chosen stayed-home?"));
        assert!(sink.contains("* main"));
        assert!(sink.contains("Alternate Timelines Created"));
        assert!(!sink.contains("landed on your main timeline"));
    }

    #[test]
    fn test_existing_branch_is_reported_and_reused() {
        let (repo, dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        repo.create_branch("what-if-travel").unwrap();
        let content = Content::embedded().unwrap();
        let mut stage = stage(&repo, &content);

        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["", "1", "1", "1", "1", "Gap year abroad", "1"]);
        write_file(dir.path(), "travel-life.txt", "Backpacking");
        {
            let mut driver = Driver::new(&sink, &mut input);
            let mut run = StageRun::new(Unit::WhatIf);
            run.advance(StageState::Exercising).unwrap();
            stage.run_guided(&mut driver, &mut run).unwrap();
        }

        assert!(sink.contains("already exists"));
        assert!(stage.validate());
        assert_eq!(repo.count_commits(Some("what-if-travel")).unwrap(), 2);
    }

    #[test]
    fn test_main_branch_falls_back_to_existing_branch() {
        let (repo, _dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        let content = Content::embedded().unwrap();
        repo.create_branch("life").unwrap();
        repo.checkout("life").unwrap();

        // none of the configured names exist: return to where the act began
        let settings = StageSettings {
            main_branches: vec!["trunk".into()],
            ..StageSettings::default()
        };
        let trunk = WhatIf::new(
            &repo,
            content.unit("act2").unwrap(),
            StageSnapshot::capture(&repo).unwrap(),
            &settings,
        )
        .unwrap();
        assert_eq!(trunk.main_branch(), "life");

        let configured = stage(&repo, &content);
        assert_eq!(configured.main_branch(), "main");
    }

    #[test]
    fn test_recommit_without_edits_suggests_editing() {
        let (repo, dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        repo.create_branch("what-if-travel").unwrap();
        repo.checkout("what-if-travel").unwrap();
        commit_file(&repo, "travel-life.txt", "Backpacking", "What if I'd chosen travel?");
        let content = Content::embedded().unwrap();
        let stage = stage(&repo, &content);

        // commit with nothing staged, ask for a hint, then run dry
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["1", "", "h"]);
        let mut run = StageRun::new(Unit::WhatIf);
        run.advance(StageState::Exercising).unwrap();
        {
            let mut driver = Driver::new(&sink, &mut input);
            let result = stage.commit_step(&mut driver, &mut run, "travel", "travel-life.txt");
            assert!(result.is_err());
        }
        assert!(sink.contains("Edit travel-life.txt if you already committed it"));
        assert_eq!(run.hints_shown(), 1);
        assert!(sink.contains("Create a file and commit on this branch"));

        write_file(dir.path(), "travel-life.txt", "Backpacking, then a job in Lisbon");
        let mut input = ScriptedInteraction::new(["3", "1", ""]);
        let mut driver = Driver::new(&sink, &mut input);
        stage
            .commit_step(&mut driver, &mut run, "travel", "travel-life.txt")
            .unwrap();
        assert_eq!(repo.count_commits(Some("what-if-travel")).unwrap(), 3);
    }

    #[test]
    fn test_guided_menus_offer_hints() {
        let (repo, dir) = init_repo();
        commit_file(&repo, "decision.txt", "University", "My first decision");
        let content = Content::embedded().unwrap();
        let mut stage = stage(&repo, &content);

        // name, hint, branch, hint, checkout, add, commit, back to main
        let sink = RecordingSink::new();
        let mut input =
            ScriptedInteraction::new(["", "hint", "1", "h", "1", "1", "1", "", "1"]);
        write_file(dir.path(), "travel-life.txt", "Backpacking");
        let run = {
            let mut driver = Driver::new(&sink, &mut input);
            run_stage(&mut stage, &mut driver).unwrap()
        };

        assert_eq!(run.state(), StageState::Concluded);
        assert_eq!(run.hints_shown(), 2);
        assert_eq!(input.remaining(), 0);
        assert!(sink.contains("Create a 'what-if' branch first"));
        assert!(sink.contains("Step into it before committing"));
    }
}
