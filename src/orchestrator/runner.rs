//! Runs the acts in order and answers one-shot `validate` / `status` queries.

use super::StatusSummary;
use crate::content::Content;
use crate::errors::{ContentError, TutorialError};
use crate::interaction::{Driver, Interaction};
use crate::repo::LifeRepo;
use crate::snapshot::StageSnapshot;
use crate::stage::{StageSettings, Unit, render_hint, run_stage};
use crate::ui::icons::{CHECK, CROSS, SPARKLE};
use crate::ui::{OutputSink, Tone};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

const FALLBACK_PREFIX: &str = "what-if-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceOutcome {
    Completed,
    /// The learner stopped between acts; `next` is where a later run resumes.
    Paused { next: Unit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationReport {
    pub unit: Unit,
    pub passed: bool,
}

pub struct Tutorial<'a> {
    content: &'a Content,
    sink: &'a dyn OutputSink,
    settings: StageSettings,
}

impl<'a> Tutorial<'a> {
    /// Fails when the content lacks an act or one of its required parameters.
    pub fn new(
        content: &'a Content,
        sink: &'a dyn OutputSink,
        settings: StageSettings,
    ) -> Result<Self, ContentError> {
        let requirements: Vec<(&str, &[&str])> = Unit::ALL
            .iter()
            .map(|unit| (unit.key(), unit.required_parameters()))
            .collect();
        content.require(&requirements)?;
        Ok(Self {
            content,
            sink,
            settings,
        })
    }

    pub fn settings(&self) -> &StageSettings {
        &self.settings
    }

    fn welcome(&self) {
        self.sink.blank();
        self.sink.panel(
            "Life.git",
            None,
            "Learn git by living a life in commits\n\nInspired by Derek Sivers on commitment",
            Tone::Story,
        );
        if self.settings.advanced {
            self.sink.line(
                "Advanced mode: you'll type the git commands yourself.",
                Tone::Muted,
            );
        }
    }

    fn act_banner(&self, unit: Unit) {
        let rule = "═".repeat(40);
        self.sink.blank();
        self.sink.line(&rule, Tone::Warning);
        self.sink
            .line(&format!("   {}", unit.title().to_uppercase()), Tone::Warning);
        self.sink.line(&rule, Tone::Warning);
    }

    fn completion_banner(&self) {
        self.sink.blank();
        self.sink.panel(
            &format!("{}Tutorial Complete!", SPARKLE),
            None,
            "You've learned git by living a life.\nYour repository now tells a story: your story.",
            Tone::Success,
        );
    }

    /// Run `units` in order against `repo`.
    ///
    /// Each act snapshots the repository when it starts. Between acts the
    /// learner is asked whether to continue; declining stops the sequence
    /// with nothing recorded, so a later run simply starts over.
    pub fn run_guided_sequence(
        &self,
        repo: &mut LifeRepo,
        units: &[Unit],
        input: &mut dyn Interaction,
    ) -> Result<SequenceOutcome> {
        self.welcome();
        let mut driver = Driver::new(self.sink, input);

        for (i, unit) in units.iter().copied().enumerate() {
            self.act_banner(unit);
            let snapshot = StageSnapshot::capture(repo)
                .with_context(|| format!("Failed to read repository state before act {}", unit.ordinal()))?;
            {
                let mut stage = unit.build(repo, self.content, &self.settings, snapshot)?;
                run_stage(stage.as_mut(), &mut driver)?;
            }

            if let Some(next) = units.get(i + 1).copied() {
                self.sink.blank();
                if !driver.confirm("Ready for the next act?", true)? {
                    self.sink.line(
                        "Take your time. Run 'lifegit start' when you're ready to continue.",
                        Tone::Muted,
                    );
                    info!(next = next.ordinal(), "learner paused the tutorial");
                    return Ok(SequenceOutcome::Paused { next });
                }
            }
        }

        self.completion_banner();
        info!(acts = units.len(), "tutorial complete");
        Ok(SequenceOutcome::Completed)
    }

    /// Check act `ordinal` against the repository at `path` without running it.
    ///
    /// The act's entry baseline is reconstructed from the repository, so the
    /// answer depends only on the current state and repeated calls agree.
    /// Nothing is created or modified.
    pub fn validate_standalone(
        &self,
        ordinal: u8,
        path: &Path,
    ) -> Result<ValidationReport, TutorialError> {
        let unit = Unit::from_ordinal(ordinal).ok_or(TutorialError::UnknownStage {
            ordinal,
            max: Unit::ALL.len() as u8,
        })?;
        let mut repo = LifeRepo::open(path)?;
        let baseline = unit.reconstructed_baseline(&repo, &self.settings)?;
        let stage = unit.build(&mut repo, self.content, &self.settings, baseline)?;

        let passed = stage.validate();
        info!(act = ordinal, passed, "standalone validation");
        if passed {
            self.sink
                .line(&format!("{}Act {} complete!", CHECK, ordinal), Tone::Success);
        } else {
            self.sink.line(
                &format!("{}Act {} not complete yet", CROSS, ordinal),
                Tone::Failure,
            );
            stage.instructions(self.sink);
            render_hint(self.sink, &stage.hint());
        }
        Ok(ValidationReport { unit, passed })
    }

    /// Summarize progress for the repository at `path`.
    pub fn show_status_summary(&self, path: &Path) -> Result<StatusSummary, TutorialError> {
        let repo = LifeRepo::open(path)?;
        let summary = StatusSummary::collect(&repo, &self.what_if_prefix())?;
        summary.render(self.sink);
        Ok(summary)
    }

    fn what_if_prefix(&self) -> String {
        if let Some(prefix) = &self.settings.what_if_prefix {
            return prefix.clone();
        }
        self.content
            .unit(Unit::WhatIf.key())
            .ok()
            .and_then(|unit| unit.prompts.param_str("branch_prefix"))
            .unwrap_or(FALLBACK_PREFIX)
            .to_string()
    }
}
