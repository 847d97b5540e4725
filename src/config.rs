//! Configuration for Life.git.
//!
//! Settings come from an optional `lifegit.toml`, then the environment, then
//! command-line flags; later layers win.
//!
//! # Configuration File Format
//!
//! ```toml
//! [tutorial]
//! advanced = false
//! directory = "~/life-repo"
//! content = "/path/to/content.toml"
//! main_branches = ["main", "master"]
//! what_if_prefix = "what-if-"
//! ```
//!
//! The file lives in `<config dir>/lifegit/lifegit.toml` unless `--config`
//! points elsewhere.

use crate::content::Content;
use crate::stage::StageSettings;
use crate::validator::DEFAULT_MAIN_BRANCHES;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "lifegit.toml";

pub const ENV_ADVANCED: &str = "LIFEGIT_ADVANCED";
pub const ENV_CONTENT: &str = "LIFEGIT_CONTENT";
pub const ENV_DIRECTORY: &str = "LIFEGIT_DIRECTORY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorialSection {
    /// Type real git commands instead of picking from menus
    #[serde(default)]
    pub advanced: bool,
    /// Default working directory for `start`
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Narrative content replacing the built-in text
    #[serde(default)]
    pub content: Option<PathBuf>,
    #[serde(default = "default_main_branches")]
    pub main_branches: Vec<String>,
    #[serde(default)]
    pub what_if_prefix: Option<String>,
}

fn default_main_branches() -> Vec<String> {
    DEFAULT_MAIN_BRANCHES.iter().map(|b| b.to_string()).collect()
}

impl Default for TutorialSection {
    fn default() -> Self {
        Self {
            advanced: false,
            directory: None,
            content: None,
            main_branches: default_main_branches(),
            what_if_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifegitToml {
    #[serde(default)]
    pub tutorial: TutorialSection,
}

impl LifegitToml {
    /// `<config dir>/lifegit/lifegit.toml`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lifegit").join(CONFIG_FILE_NAME))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse lifegit.toml")
    }

    /// An explicit path must exist; the default location may be absent.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        match Self::default_path() {
            Some(path) if path.exists() => Ok((Self::load(&path)?, Some(path))),
            _ => Ok((Self::default(), None)),
        }
    }

    /// Overlay values from the environment, read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_ADVANCED) {
            self.tutorial.advanced = parse_flag(&value)
                .with_context(|| format!("Invalid value for {ENV_ADVANCED}"))?;
        }
        if let Some(value) = lookup(ENV_CONTENT).filter(|v| !v.is_empty()) {
            self.tutorial.content = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_DIRECTORY).filter(|v| !v.is_empty()) {
            self.tutorial.directory = Some(PathBuf::from(value));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Problems worth mentioning that do not stop the tutorial.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let tutorial = &self.tutorial;

        if tutorial.main_branches.is_empty() {
            warnings.push(
                "main_branches is empty: the branching act can never be completed".to_string(),
            );
        }
        if tutorial.main_branches.iter().any(|b| b.trim().is_empty()) {
            warnings.push("main_branches contains an empty branch name".to_string());
        }
        if let Some(prefix) = &tutorial.what_if_prefix
            && prefix.trim().is_empty()
        {
            warnings.push(
                "what_if_prefix is empty: every branch would count as a what-if branch"
                    .to_string(),
            );
        }
        if let Some(content) = &tutorial.content
            && !expand_home(content).exists()
        {
            warnings.push(format!("Content file not found: {}", content.display()));
        }

        warnings
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("'{}' is not a boolean (use true or false)", other),
    }
}

/// Replace a leading `~` with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    pub toml: LifegitToml,
    /// File the settings were read from, if any.
    pub source: Option<PathBuf>,
}

impl Config {
    /// File and environment layers.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (mut toml, source) = LifegitToml::load_or_default(explicit)?;
        toml.apply_env()?;
        debug!(source = ?source, "configuration loaded");
        Ok(Self { toml, source })
    }

    /// CLI layer: `--advanced` can only switch advanced mode on.
    pub fn with_advanced(mut self, advanced: bool) -> Self {
        if advanced {
            self.toml.tutorial.advanced = true;
        }
        self
    }

    pub fn stage_settings(&self) -> StageSettings {
        let tutorial = &self.toml.tutorial;
        StageSettings {
            advanced: tutorial.advanced,
            main_branches: tutorial.main_branches.clone(),
            what_if_prefix: tutorial.what_if_prefix.clone(),
        }
    }

    /// Configured content file, or the built-in text.
    pub fn content(&self) -> Result<Content> {
        let path = self.toml.tutorial.content.as_deref().map(expand_home);
        Content::load_or_embedded(path.as_deref()).context("Failed to load tutorial content")
    }

    /// Where `start` should work: the CLI argument, then the configured
    /// directory, then the current directory.
    pub fn start_directory(&self, cli: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli {
            return Ok(dir);
        }
        if let Some(dir) = &self.toml.tutorial.directory {
            return Ok(expand_home(dir));
        }
        std::env::current_dir().context("Failed to determine the current directory")
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
