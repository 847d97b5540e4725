//! Learner input.
//!
//! Every suspension point of the tutorial (menu selection, free text,
//! "press Enter to check again") goes through the `Interaction` trait, so
//! tests can script the learner. `Driver` builds the menu-driven surface on
//! top of an interaction provider and an output sink.

mod driver;
mod scripted;
mod terminal;

pub use driver::{Driver, MenuOption};
pub use scripted::ScriptedInteraction;
pub use terminal::TerminalInteraction;

use anyhow::Result;

/// A source of learner responses. Every call blocks until one arrives.
pub trait Interaction {
    /// One raw line of input; may be empty.
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Free text, offering `default` for empty input.
    fn read_text(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
}
