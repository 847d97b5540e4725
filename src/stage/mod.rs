//! Exercise stages.
//!
//! A stage walks one act of the tutorial through a fixed lifecycle:
//!
//! ```text
//! Introduced -> Exercising <-> Hinting
//!                   |
//!                   v
//!               Validated -> Concluded
//! ```
//!
//! `run_stage` drives the lifecycle. Each act supplies its guided exercise,
//! its completion check and its diagnostic hint through the `Stage` trait;
//! advanced mode and the recheck loop are shared.

mod first_decision;
mod what_if;

pub use first_decision::{DecisionStep, FirstDecision};
pub use what_if::{WhatIf, WhatIfStep};

use crate::content::{Content, UnitContent};
use crate::errors::{ContentError, RepoError, StageError};
use crate::interaction::{Driver, MenuOption};
use crate::repo::LifeRepo;
use crate::snapshot::StageSnapshot;
use crate::ui::icons::{BULB, CHECK, CROSS, SPARKLE};
use crate::ui::{OutputSink, Tone};
use crate::validator::DEFAULT_MAIN_BRANCHES;
use anyhow::Result;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Introduced,
    Exercising,
    Hinting,
    Validated,
    Concluded,
}

impl StageState {
    pub fn can_advance_to(self, next: StageState) -> bool {
        use StageState::*;
        matches!(
            (self, next),
            (Introduced, Exercising)
                | (Exercising, Hinting)
                | (Hinting, Exercising)
                | (Exercising, Validated)
                | (Validated, Concluded)
        )
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Lifecycle bookkeeping for one pass through a stage.
#[derive(Debug)]
pub struct StageRun {
    unit: Unit,
    state: StageState,
    hints_shown: usize,
}

impl StageRun {
    pub fn new(unit: Unit) -> Self {
        Self {
            unit,
            state: StageState::Introduced,
            hints_shown: 0,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn state(&self) -> StageState {
        self.state
    }

    pub fn hints_shown(&self) -> usize {
        self.hints_shown
    }

    pub fn advance(&mut self, next: StageState) -> Result<(), StageError> {
        if !self.state.can_advance_to(next) {
            return Err(StageError::IllegalTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(act = self.unit.ordinal(), from = %self.state, to = %next, "stage transition");
        if next == StageState::Hinting {
            self.hints_shown += 1;
        }
        self.state = next;
        Ok(())
    }
}

/// The acts of the tutorial, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    FirstDecision,
    WhatIf,
}

impl Unit {
    pub const ALL: [Unit; 2] = [Unit::FirstDecision, Unit::WhatIf];

    pub fn ordinal(self) -> u8 {
        match self {
            Unit::FirstDecision => 1,
            Unit::WhatIf => 2,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.ordinal() == ordinal)
    }

    /// Table name in the content file.
    pub fn key(self) -> &'static str {
        match self {
            Unit::FirstDecision => "act1",
            Unit::WhatIf => "act2",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Unit::FirstDecision => "Act 1: First Decision",
            Unit::WhatIf => "Act 2: What If",
        }
    }

    /// Content parameters the act cannot run without.
    pub fn required_parameters(self) -> &'static [&'static str] {
        match self {
            Unit::FirstDecision => FirstDecision::REQUIRED_PARAMETERS,
            Unit::WhatIf => WhatIf::REQUIRED_PARAMETERS,
        }
    }

    pub fn build<'r>(
        self,
        repo: &'r mut LifeRepo,
        content: &'r Content,
        settings: &StageSettings,
        snapshot: StageSnapshot,
    ) -> Result<Box<dyn Stage + 'r>, ContentError> {
        let unit_content = content.unit(self.key())?;
        Ok(match self {
            Unit::FirstDecision => Box::new(FirstDecision::new(
                repo,
                unit_content,
                snapshot,
                settings,
            )?),
            Unit::WhatIf => Box::new(WhatIf::new(repo, unit_content, snapshot, settings)?),
        })
    }

    /// Entry baseline for checking the act after the fact.
    ///
    /// The first act starts from an empty history. The second starts from
    /// whatever the main branch holds, so work on a what-if branch counts as
    /// progress.
    pub fn reconstructed_baseline(
        self,
        repo: &LifeRepo,
        settings: &StageSettings,
    ) -> Result<StageSnapshot, RepoError> {
        let snapshot = StageSnapshot::capture(repo)?;
        let commits = match self {
            Unit::FirstDecision => 0,
            Unit::WhatIf => settings
                .main_branches
                .iter()
                .find_map(|b| repo.count_commits(Some(b)).ok())
                .unwrap_or(0),
        };
        Ok(snapshot.with_commits(commits))
    }
}

/// Knobs shared by every stage, resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSettings {
    /// Skip menus and let the learner type real git commands.
    pub advanced: bool,
    /// Branches that count as "your actual path".
    pub main_branches: Vec<String>,
    /// Overrides the content's `branch_prefix`.
    pub what_if_prefix: Option<String>,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            advanced: false,
            main_branches: DEFAULT_MAIN_BRANCHES.iter().map(|b| b.to_string()).collect(),
            what_if_prefix: None,
        }
    }
}

/// The single most relevant next step for a learner who is stuck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    pub message: String,
    pub commands: Vec<String>,
}

impl Hint {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            commands: Vec::new(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }
}

pub fn render_hint(sink: &dyn OutputSink, hint: &Hint) {
    let mut body = hint.message.clone();
    if !hint.commands.is_empty() {
        body.push('\n');
        for command in &hint.commands {
            body.push_str(&format!("\n    $ {command}"));
        }
    }
    sink.blank();
    sink.panel(&format!("{}Hint", BULB), None, &body, Tone::Hint);
}

/// One act of the tutorial.
pub trait Stage {
    fn unit(&self) -> Unit;

    fn content(&self) -> &UnitContent;

    fn is_advanced(&self) -> bool;

    /// Menu-driven exercise. Sub-goals run strictly in order; every menu
    /// also offers the diagnostic hint, recorded on `run`.
    fn run_guided(&mut self, driver: &mut Driver<'_>, run: &mut StageRun) -> Result<()>;

    /// Whether the learner has done what the act asks. Never fails.
    fn validate(&self) -> bool;

    fn hint(&self) -> Hint;

    /// Structural view of the repository shown with the conclusion.
    fn summarize(&self, sink: &dyn OutputSink);

    fn introduction(&self, sink: &dyn OutputSink) {
        let content = self.content();
        sink.blank();
        sink.panel(
            self.unit().title(),
            content.prompts.param_str("subtitle"),
            &content.narrative.introduction,
            Tone::Story,
        );
    }

    fn instructions(&self, sink: &dyn OutputSink) {
        sink.blank();
        sink.panel("Your Task", None, &self.content().prompts.instructions, Tone::Task);
    }

    fn run_exercise(&mut self, driver: &mut Driver<'_>, run: &mut StageRun) -> Result<()> {
        if self.is_advanced() {
            run_advanced(&*self, driver, run)
        } else {
            self.run_guided(driver, run)
        }
    }

    fn conclusion(&self, sink: &dyn OutputSink) {
        let title = match self.content().prompts.param_str("conclusion_title") {
            Some(title) => format!("{}{}", SPARKLE, title),
            None => format!("{}{} complete", SPARKLE, self.unit().title()),
        };
        sink.blank();
        sink.panel(
            &title,
            None,
            &self.content().narrative.conclusion,
            Tone::Success,
        );
        self.summarize(sink);
        let learned = self.content().prompts.param_list("learned");
        if !learned.is_empty() {
            sink.blank();
            sink.line("What you learned:", Tone::Story);
            for item in learned {
                sink.line(&format!("  {item}"), Tone::Plain);
            }
        }
    }
}

/// Menu entry that shows the hint without advancing the sub-goal.
pub(crate) fn hint_option<A>(action: A) -> MenuOption<A> {
    MenuOption::new("h", "hint", "Stuck? Show the next step", action)
}

fn is_hint_request(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "hint" | "h")
}

/// Show the stage's diagnostic hint, passing through `Hinting`.
pub(crate) fn offer_hint<S: Stage + ?Sized>(
    stage: &S,
    driver: &Driver<'_>,
    run: &mut StageRun,
) -> Result<()> {
    run.advance(StageState::Hinting)?;
    render_hint(driver.sink(), &stage.hint());
    run.advance(StageState::Exercising)?;
    Ok(())
}

/// Free-form mode: the learner works in their own shell and comes back to
/// have the result checked.
fn run_advanced<S: Stage + ?Sized>(
    stage: &S,
    driver: &mut Driver<'_>,
    run: &mut StageRun,
) -> Result<()> {
    stage.instructions(driver.sink());
    let prompts = &stage.content().prompts;
    driver.sink().line(
        prompts.param_str_or("advanced_prompt", "Press Enter when you're done."),
        Tone::Muted,
    );
    driver.sink().line(
        "Type 'hint' if you get stuck, 'hints' for every tip.",
        Tone::Muted,
    );
    loop {
        let answer = driver.read_line("Check")?;
        match answer.trim().to_lowercase().as_str() {
            "hint" => offer_hint(stage, driver, run)?,
            "hints" => {
                run.advance(StageState::Hinting)?;
                let sink = driver.sink();
                sink.blank();
                sink.line(&format!("{}Tips", BULB), Tone::Hint);
                for (i, tip) in prompts.hints.iter().enumerate() {
                    sink.line(&format!("  {}. {}", i + 1, tip), Tone::Hint);
                }
                run.advance(StageState::Exercising)?;
            }
            _ => {
                if stage.validate() {
                    return Ok(());
                }
                driver
                    .sink()
                    .line("Not quite there yet. Type 'hint' for a nudge.", Tone::Warning);
            }
        }
    }
}

/// Drive `stage` from introduction to conclusion.
///
/// After the exercise the stage is rechecked until it validates; the
/// learner fixes things outside the tutorial and presses Enter, or types
/// `hint` to see the next unmet step first.
pub fn run_stage<S: Stage + ?Sized>(stage: &mut S, driver: &mut Driver<'_>) -> Result<StageRun> {
    let mut run = StageRun::new(stage.unit());
    info!(
        act = stage.unit().ordinal(),
        advanced = stage.is_advanced(),
        "stage started"
    );

    stage.introduction(driver.sink());
    run.advance(StageState::Exercising)?;
    stage.run_exercise(driver, &mut run)?;

    while !stage.validate() {
        debug!(act = stage.unit().ordinal(), "exercise done but stage not complete");
        driver.sink().line(
            &format!(
                "{}Not quite complete yet. Check your work, then press Enter (or type 'hint').",
                CROSS
            ),
            Tone::Warning,
        );
        let answer = driver.read_line("Press Enter to check again")?;
        if is_hint_request(&answer) {
            offer_hint(&*stage, driver, &mut run)?;
        }
    }
    run.advance(StageState::Validated)?;
    driver
        .sink()
        .line(&format!("{}{} validated", CHECK, stage.unit().title()), Tone::Success);

    stage.conclusion(driver.sink());
    run.advance(StageState::Concluded)?;
    info!(
        act = stage.unit().ordinal(),
        hints = run.hints_shown(),
        "stage concluded"
    );
    Ok(run)
}

/// `git branch` style listing, current branch starred.
pub fn branch_lines(repo: &LifeRepo) -> Result<Vec<String>, RepoError> {
    let current = if repo.has_commits() {
        Some(repo.current_branch_name()?)
    } else {
        None
    };
    Ok(repo
        .list_branch_names()?
        .into_iter()
        .map(|name| {
            if current.as_deref() == Some(name.as_str()) {
                format!("* {name}")
            } else {
                format!("  {name}")
            }
        })
        .collect())
}

/// Print what `git branch` would.
pub fn show_branches(repo: &LifeRepo, sink: &dyn OutputSink) {
    sink.blank();
    sink.line("$ git branch", Tone::Command);
    match branch_lines(repo) {
        Ok(lines) if lines.is_empty() => {
            sink.line("(no branches yet: make a commit first)", Tone::Muted)
        }
        Ok(lines) => {
            for line in lines {
                sink.line(&line, Tone::Plain);
            }
        }
        Err(e) => sink.line(&format!("{}{}", CROSS, e), Tone::Failure),
    }
}

/// Print a condensed `git status`.
pub fn show_status(repo: &LifeRepo, sink: &dyn OutputSink) {
    sink.blank();
    sink.line("$ git status", Tone::Command);
    if let Err(e) = write_status(repo, sink) {
        sink.line(&format!("{}{}", CROSS, e), Tone::Failure);
    }
}

fn write_status(repo: &LifeRepo, sink: &dyn OutputSink) -> Result<(), RepoError> {
    sink.line(&format!("On branch {}", repo.current_branch_name()?), Tone::Plain);
    if !repo.has_commits() {
        sink.line("No commits yet", Tone::Plain);
    }

    let staged = repo.staged_file_paths()?;
    let untracked = repo.untracked_file_paths()?;
    if !staged.is_empty() {
        sink.line("Changes to be committed:", Tone::Plain);
        for path in &staged {
            sink.line(&format!("    {path}"), Tone::Success);
        }
    }
    if !untracked.is_empty() {
        sink.line("Untracked files:", Tone::Plain);
        for path in &untracked {
            sink.line(&format!("    {path}"), Tone::Failure);
        }
    }
    if staged.is_empty() && untracked.is_empty() {
        if repo.has_uncommitted_changes()? {
            sink.line("Changes not staged for commit.", Tone::Warning);
        } else {
            sink.line("nothing to commit, working tree clean", Tone::Muted);
        }
    }
    Ok(())
}
