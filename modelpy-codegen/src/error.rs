//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Model validation error.
    #[error("model error: {0}")]
    Model(#[from] modelpy_model::ModelError),

    /// A rule-expression or type-parameter combination with no lowering rule.
    #[error("unsupported construct '{construct}' at '{path}'")]
    UnsupportedConstruct {
        /// Description of the construct.
        construct: String,
        /// Identifier path of the offending element.
        path: String,
    },

    /// Required, unwrapped mutual dependency between composites.
    #[error("irreducible required cycle: {path}")]
    IrreducibleCycle {
        /// Cycle path, e.g. `demo.A -> demo.B -> demo.A`.
        path: String,
    },

    /// Two sibling identifiers mangle to the same output identifier.
    #[error("name collision on '{name}' at '{path}'")]
    NameCollision {
        /// The colliding output identifier.
        name: String,
        /// Identifier path of the second occurrence.
        path: String,
    },

    /// Code generation error.
    #[error("generation error: {message}")]
    Generation {
        /// Error message.
        message: String,
    },
}

impl CodegenError {
    /// Creates an unsupported construct error.
    pub fn unsupported(construct: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnsupportedConstruct {
            construct: construct.into(),
            path: path.into(),
        }
    }

    /// Creates a generation error with the given message.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }
}
