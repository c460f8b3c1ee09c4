//! Error types shared across crafthook crates.

use thiserror::Error;

/// Errors produced when parsing or constructing an [`Identifier`](crate::Identifier).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// The namespace part was empty
    #[error("Empty namespace in identifier \"{0}\"")]
    EmptyNamespace(String),

    /// The path part was empty
    #[error("Empty path in identifier \"{0}\"")]
    EmptyPath(String),

    /// A character outside the allowed set
    #[error("Invalid character '{ch}' in identifier \"{input}\"")]
    InvalidChar {
        /// Full input being parsed
        input: String,
        /// Offending character
        ch: char,
    },

    /// A path segment that is empty, `.` or `..`
    #[error("Invalid path segment \"{segment}\" in identifier \"{input}\"")]
    InvalidSegment {
        /// Full input being parsed
        input: String,
        /// Offending segment
        segment: String,
    },
}

/// Result type alias for identifier operations.
pub type IdentifierResult<T> = Result<T, IdentifierError>;
