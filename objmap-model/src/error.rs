//! Error types for objmap

use thiserror::Error;

/// Mapper error types
///
/// Every variant is fatal for the call that produced it: the in-progress
/// document is dropped and no partial value is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapperError {
    /// A key was populated that the resolved strategy has no place for.
    #[error("Unknown property '{key}' for {class}")]
    UnknownProperty {
        /// Name of the class (or shape) being populated
        class: String,
        /// Offending key as it appeared in the input
        key: String,
    },
    /// The event sequence broke nesting discipline.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),
    /// A value was not assignable to the requested type.
    #[error("Invalid cast: expected {expected}, found {found}")]
    InvalidCast {
        /// Type that was requested
        expected: String,
        /// Type of the value that was actually produced
        found: String,
    },
    /// The writer met a value with no scalar or structured rendering.
    #[error("Unsupported scalar type: {0}")]
    UnsupportedScalarType(String),
    /// A record component was never populated under the strict policy.
    #[error("Missing component '{component}' for record {record}")]
    MissingComponent {
        /// Record class name
        record: String,
        /// Component that received no value
        component: String,
    },
    /// A configured limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// The scanner could not tokenize the input text.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl MapperError {
    /// Shorthand for [`MapperError::StructuralMismatch`]
    pub fn structural(msg: impl Into<String>) -> Self {
        MapperError::StructuralMismatch(msg.into())
    }

    /// Shorthand for [`MapperError::InvalidCast`]
    pub fn invalid_cast(expected: impl Into<String>, found: impl Into<String>) -> Self {
        MapperError::InvalidCast {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MapperError>;
