//! Error signal for emits that hit a compiler invariant violation.
//!
//! The emitter works on trees that were already checked, so there is no
//! user-facing error channel here. Anything that goes wrong is a defect in an
//! earlier stage (or in a pass) and aborts the current file.

use thiserror::Error;

/// Result alias used throughout the transform pipeline and printer.
pub type EmitResult<T> = Result<T, EmitError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmitError {
    /// A node kind reached a place that should never see it.
    #[error("internal error: unexpected {kind} node at {pos} ({context})")]
    UnexpectedNode {
        kind: String,
        pos: u32,
        context: &'static str,
    },

    /// A required child slot was empty.
    #[error("internal error: {kind} node is missing its {child}")]
    MissingChild { kind: String, child: &'static str },

    /// A push/pop stack was popped without a matching push.
    #[error("internal error: unbalanced {0} stack")]
    UnbalancedStack(&'static str),

    /// A node shape that the lowering passes cannot express.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The emit host could not store an output file.
    #[error("failed to write {path}: {message}")]
    WriteFile { path: String, message: String },

    /// Any other broken invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EmitError {
    pub fn internal(message: impl Into<String>) -> Self {
        EmitError::Internal(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        EmitError::Unsupported(message.into())
    }

    /// True for errors that indicate a defect rather than an unsupported input shape.
    pub const fn is_internal(&self) -> bool {
        !matches!(self, EmitError::Unsupported(_) | EmitError::WriteFile { .. })
    }
}
