//! CLI command implementations.
//!
//! | Module     | Commands handled |
//! |------------|------------------|
//! | `start`    | `Start`          |
//! | `check`    | `Validate`, `Status` |
//! | `config`   | `Config`         |

pub mod check;
pub mod config;
pub mod start;

pub use check::{cmd_status, cmd_validate};
pub use config::cmd_config;
pub use start::cmd_start;

use anyhow::Result;
use lifegit::config::Config;
use lifegit::ui::{ConsoleSink, OutputSink, Tone};
use tracing::warn;

use super::Cli;

/// Resolve configuration and surface its warnings.
pub fn load_config(cli: &Cli, sink: &dyn OutputSink) -> Result<Config> {
    let config = Config::load(cli.config.as_deref())?;
    for warning in config.validate() {
        warn!(%warning, "configuration warning");
        sink.line(&format!("Config: {warning}"), Tone::Warning);
    }
    Ok(config)
}

pub fn console() -> ConsoleSink {
    ConsoleSink::new()
}
