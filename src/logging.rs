//! Diagnostic tracing.
//!
//! Tracing output is for whoever debugs the tutorial, not for the learner:
//! it goes to stderr and is silent unless `RUST_LOG` or `--verbose` asks for
//! it. Everything the learner reads goes through `ui::OutputSink`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("warn,lifegit=debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber. Call once, from the binary.
///
/// ```bash
/// RUST_LOG=lifegit=debug lifegit status
/// ```
pub fn init(verbose: bool) {
    tracing_subscriber::registry()
        .with(filter(verbose))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_verbose_enables_crate_debug() {
        assert_eq!(filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
