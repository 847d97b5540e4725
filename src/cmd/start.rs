//! `lifegit start`: run both acts interactively.

use anyhow::{Context, Result};
use lifegit::interaction::TerminalInteraction;
use lifegit::orchestrator::{SequenceOutcome, Tutorial};
use lifegit::repo::LifeRepo;
use lifegit::stage::Unit;
use std::path::PathBuf;
use tracing::info;

use super::{console, load_config};
use crate::Cli;

pub fn cmd_start(cli: &Cli, directory: Option<PathBuf>, advanced: bool) -> Result<()> {
    let sink = console();
    let config = load_config(cli, &sink)?.with_advanced(advanced);
    let content = config.content()?;

    let directory = config.start_directory(directory)?;
    std::fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create directory: {}", directory.display()))?;
    let directory = directory
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory: {}", directory.display()))?;
    // Learners type shell commands relative to where they are told to work.
    std::env::set_current_dir(&directory)
        .with_context(|| format!("Failed to enter directory: {}", directory.display()))?;
    info!(directory = %directory.display(), "starting tutorial");

    let tutorial = Tutorial::new(&content, &sink, config.stage_settings())?;
    let mut repo = LifeRepo::open(&directory)?;
    let mut input = TerminalInteraction::new();

    match tutorial.run_guided_sequence(&mut repo, &Unit::ALL, &mut input)? {
        SequenceOutcome::Completed => {}
        SequenceOutcome::Paused { next } => {
            info!(next = next.ordinal(), "paused before act");
        }
    }
    Ok(())
}
