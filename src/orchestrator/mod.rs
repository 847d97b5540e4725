pub mod runner;
pub mod summary;

pub use runner::{SequenceOutcome, Tutorial, ValidationReport};
pub use summary::StatusSummary;
