//! Tracing configuration for debugging resolution order.
//!
//! Supports three output formats controlled by `ETS_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`, useful for
//!   following nested super/interface/obligation resolution
//! - `json`: One JSON object per span/event
//!
//! ## Quick start
//!
//! ```bash
//! # Nested view of facet resolution
//! ETS_LOG=ets_checker=debug ETS_LOG_FORMAT=tree cargo test -p ets-checker
//!
//! # Only the interop synthesizer
//! ETS_LOG="ets_checker::dynamic_interop=trace" cargo test -p ets-checker
//! ```
//!
//! The subscriber is only initialised when `ETS_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Standard flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a format name; anything unknown is `Text`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("ETS_LOG_FORMAT").unwrap_or_default())
    }
}

/// Build an `EnvFilter` from `ETS_LOG`, falling back to `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("ETS_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `ETS_LOG` nor `RUST_LOG` is set. Safe to call
/// more than once (tests call it from every case); later calls are ignored.
/// All output goes to stderr.
pub fn init_tracing() {
    let has_ets_log = std::env::var("ETS_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_ets_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    // try_init: a subscriber may already be installed by an earlier caller.
    let _ = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
}

#[cfg(test)]
mod tests {
    use super::LogFormat;

    #[test]
    fn unknown_format_falls_back_to_text() {
        assert_eq!(LogFormat::parse("TREE"), LogFormat::Tree);
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
    }
}
