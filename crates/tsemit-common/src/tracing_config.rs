//! Tracing configuration for debugging emit output.
//!
//! Supports three output formats controlled by `TSEMIT_LOG_FORMAT`:
//!
//! - `text` (default): Standard `tracing-subscriber` flat output
//! - `tree`: Hierarchical indented output via `tracing-tree`
//! - `json`: One JSON object per span/event
//!
//! Useful filter targets:
//!
//! - `tsemit_emitter::emit`: each program emitted and every file written
//! - `tsemit_emitter::transforms::ts`: classes, namespaces, elided imports and
//!   inlined constants
//! - `tsemit_emitter::transforms::es2015::loops`: per-iteration loop functions
//!   and the jump markers they return
//! - `tsemit_emitter::printer`: generated names, helpers written and each
//!   emitted node (at `trace`)
//!
//! ```bash
//! TSEMIT_LOG=debug TSEMIT_LOG_FORMAT=tree cargo test -p tsemit-emitter
//! TSEMIT_LOG="tsemit_emitter::transforms::es2015::loops=trace" cargo test --test converted_loop_tests
//! TSEMIT_LOG="tsemit_emitter::printer=debug,tsemit_emitter::emit=debug" cargo test --test emit_tests
//! ```
//!
//! The subscriber is only initialised when `TSEMIT_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Case-insensitive; anything unrecognised falls back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("TSEMIT_LOG_FORMAT").unwrap_or_default())
    }
}

/// `TSEMIT_LOG` takes precedence over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("TSEMIT_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `TSEMIT_LOG` nor `RUST_LOG` is set. Calling it
/// more than once (e.g. from several tests) is harmless: later calls keep
/// the subscriber installed by the first one.
pub fn init_tracing() {
    let has_own_log = std::env::var("TSEMIT_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    let result = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
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
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" Tree "), LogFormat::Tree);
        assert_eq!(LogFormat::parse("text"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }
}
