//! Error types for model validation.

use thiserror::Error;

/// Error type for resolved-model validation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A type reference could not be bound within the model set.
    ///
    /// The upstream resolver is responsible for binding references; a model
    /// that still carries one of these is rejected before generation starts.
    #[error("unresolved reference to '{type_name}' at '{path}'")]
    UnresolvedReference {
        /// Identifier path of the referring attribute or symbol.
        path: String,
        /// Name of the type that could not be bound.
        type_name: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} definition: '{name}'")]
    DuplicateDefinition {
        /// Kind of definition (type, enum, function, attribute).
        kind: String,
        /// Name of the duplicate.
        name: String,
    },

    /// Invalid cardinality bounds.
    #[error("invalid cardinality ({min}..{max}) on attribute '{attribute}'")]
    InvalidCardinality {
        /// Identifier path of the attribute.
        attribute: String,
        /// Lower bound.
        min: u32,
        /// Upper bound as declared (`*` for unbounded).
        max: String,
    },

    /// Model deserialization error.
    #[error("model deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Validation error.
    #[error("validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },
}

impl ModelError {
    /// Creates an unresolved reference error.
    pub fn unresolved(path: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            path: path.into(),
            type_name: type_name.into(),
        }
    }

    /// Creates a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateDefinition {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Creates a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
