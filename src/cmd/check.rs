//! Read-only commands: `lifegit validate` and `lifegit status`.

use anyhow::{Result, bail};
use lifegit::orchestrator::Tutorial;
use std::path::Path;

use super::{console, load_config};
use crate::Cli;

fn existing_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!("Path does not exist or is not a directory: {}", path.display());
    }
    Ok(())
}

/// Exits zero whether or not the act passed; only bad input is an error.
pub fn cmd_validate(cli: &Cli, act: u8, path: &Path) -> Result<()> {
    existing_dir(path)?;
    let sink = console();
    let config = load_config(cli, &sink)?;
    let content = config.content()?;
    let tutorial = Tutorial::new(&content, &sink, config.stage_settings())?;
    tutorial.validate_standalone(act, path)?;
    Ok(())
}

pub fn cmd_status(cli: &Cli, path: &Path) -> Result<()> {
    existing_dir(path)?;
    let sink = console();
    let config = load_config(cli, &sink)?;
    let content = config.content()?;
    let tutorial = Tutorial::new(&content, &sink, config.stage_settings())?;
    tutorial.show_status_summary(path)?;
    Ok(())
}
