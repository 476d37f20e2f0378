//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate; the core library never logs.
//! `RUST_LOG` is honored; `-v` raises the level for this project's crates only.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// * `verbosity` - 0 = INFO, 1 = DEBUG, 2+ = TRACE
/// * `json` - If true, emit JSON lines to stderr
pub fn init(verbosity: u8, json: bool) {
    let filter = build_filter(
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
        verbosity,
    );

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

/// `RUST_LOG` (or `warn`) plus the verbosity level for this project's crates.
///
/// Only crate-scoped directives are added, so a global level from `RUST_LOG` survives.
fn build_filter(env: Option<&str>, verbosity: u8) -> EnvFilter {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let mut filter = env
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    for target in ["modalias", "modalias_core"] {
        if let Ok(directive) = format!("{target}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives(filter: &EnvFilter) -> Vec<String> {
        filter.to_string().split(',').map(str::to_string).collect()
    }

    #[test]
    fn test_rust_log_global_level_survives() {
        let found = directives(&build_filter(Some("debug"), 0));
        assert!(found.contains(&"debug".to_string()), "{found:?}");
        assert!(found.contains(&"modalias=info".to_string()), "{found:?}");
    }

    #[test]
    fn test_verbosity_scoped_to_project_crates() {
        let found = directives(&build_filter(None, 1));
        assert!(found.contains(&"warn".to_string()), "{found:?}");
        assert!(found.contains(&"modalias=debug".to_string()), "{found:?}");
        assert!(found.contains(&"modalias_core=debug".to_string()), "{found:?}");
    }
}
