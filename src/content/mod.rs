//! Narrative content for each act, loaded from TOML.
//!
//! The default content is compiled into the binary; a different file can be
//! supplied through configuration. Each act has a fixed shape (narrative
//! text, instructions, ordered hints) plus free-form prompt parameters that
//! land in an extension map and are read through typed accessors.
//!
//! ```toml
//! [act1.narrative]
//! introduction = "..."
//! conclusion = "..."
//!
//! [act1.prompts]
//! instructions = "..."
//! hints = ["...", "..."]
//! file_name = "decision.txt"
//! ```

use crate::errors::ContentError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Content shipped with the binary.
pub const EMBEDDED_CONTENT: &str = include_str!("../../content/lifegit.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Narrative {
    pub introduction: String,
    pub conclusion: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prompts {
    pub instructions: String,
    #[serde(default)]
    pub hints: Vec<String>,
    /// Act-specific parameters such as `file_name` or `branch_prefix`.
    #[serde(flatten)]
    extra: BTreeMap<String, toml::Value>,
}

impl Prompts {
    pub fn param(&self, key: &str) -> Option<&toml::Value> {
        self.extra.get(key)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(toml::Value::as_str)
    }

    pub fn param_str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.param_str(key).unwrap_or(default)
    }

    /// String items of an array parameter; non-strings are skipped.
    pub fn param_list(&self, key: &str) -> Vec<&str> {
        self.param(key)
            .and_then(toml::Value::as_array)
            .map(|items| items.iter().filter_map(toml::Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn require_str(&self, unit: &str, key: &str) -> Result<&str, ContentError> {
        self.param_str(key)
            .ok_or_else(|| ContentError::MissingParameter {
                unit: unit.to_string(),
                key: key.to_string(),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitContent {
    pub narrative: Narrative,
    pub prompts: Prompts,
}

#[derive(Debug, Clone)]
pub struct Content {
    units: BTreeMap<String, UnitContent>,
}

impl Content {
    pub fn embedded() -> Result<Self, ContentError> {
        Self::parse(EMBEDDED_CONTENT, "embedded content")
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let text = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Load from `path` if given, otherwise the embedded content.
    pub fn load_or_embedded(path: Option<&Path>) -> Result<Self, ContentError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }

    pub fn parse(text: &str, origin: &str) -> Result<Self, ContentError> {
        let units = toml::from_str(text).map_err(|source| ContentError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Ok(Self { units })
    }

    pub fn unit(&self, key: &str) -> Result<&UnitContent, ContentError> {
        self.units
            .get(key)
            .ok_or_else(|| ContentError::UnknownUnit(key.to_string()))
    }

    pub fn unit_keys(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    /// Check that each `(unit, parameters)` pair is present.
    pub fn require(&self, requirements: &[(&str, &[&str])]) -> Result<(), ContentError> {
        for (unit, params) in requirements {
            let content = self.unit(unit)?;
            for key in *params {
                content.prompts.require_str(unit, key)?;
            }
        }
        Ok(())
    }
}
