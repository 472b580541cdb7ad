//! Structured logging setup
//!
//! Logs go to stderr so `--json` output on stdout stays machine-readable.
//! `RUST_LOG` overrides the configured level when set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the level filter: `RUST_LOG` first, then `level`, then `info`
pub fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. JSON lines when `json` is set (production),
/// human-readable text otherwise. Later calls are no-ops.
pub fn init(level: &str, json: bool) {
    let json_layer = json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));

    let _ = tracing_subscriber::registry()
        .with(filter(level))
        .with(json_layer)
        .with(text_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_level_falls_back() {
        // Must not panic on garbage directives
        let _ = filter("not a [valid directive");
        let _ = filter("debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init("warn", false);
        init("debug", true);
    }
}
