//! Common types and utilities for the tsemit TypeScript emitter.
//!
//! This crate provides foundational types used across all tsemit crates:
//! - Common enums (`NewLineKind`, `ScriptTarget`)
//! - Compiler options read from tsconfig-style JSON
//! - Emit errors (`EmitError`, `EmitResult`)
//! - Line maps and trivia skipping for source positions
//! - Source map generation (VLQ mappings, v3 JSON)
//! - Comment range scanning
//! - Diagnostics and tracing setup

// Common types - target level and newline style
pub mod common;
pub use common::{NewLineKind, ScriptTarget};

// Compiler options
pub mod options;
pub use options::{CompilerOptions, ConfigError};

// Internal error signal for aborted emits
pub mod error;
pub use error::{EmitError, EmitResult};

// Position/line helpers for source locations
pub mod position;
pub use position::{LineAndColumn, LineMap, skip_trivia};

// Source Map generation
pub mod source_map;

// Comment scanning utilities
pub mod comments;
pub use comments::{CommentKind, CommentRange};

// Diagnostics produced during declaration emit
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Opt-in tracing subscriber
pub mod tracing_config;

/// Marker position for nodes that do not come from source text.
pub const NO_POS: u32 = u32::MAX;
