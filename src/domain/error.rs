//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors are raised by the tree transforms and lookups.
/// They indicate a malformed tree or a programming defect, never a transient condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("unsupported element kind '{kind}': {context}")]
    UnsupportedKind { kind: String, context: String },

    #[error("cannot decode complex record: {message}")]
    Decode { message: String },

    #[error("array shape {shape:?} does not match {len} elements")]
    ShapeMismatch { shape: Vec<usize>, len: usize },

    #[error("could not recursively find key: {0}")]
    KeyNotFound(String),

    #[error("intermediate value is not a mapping at: {0}")]
    NotAMapping(String),
}

impl DomainError {
    pub(crate) fn unsupported(kind: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnsupportedKind {
            kind: kind.into(),
            context: context.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
