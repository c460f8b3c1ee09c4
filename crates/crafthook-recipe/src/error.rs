//! Error types for recipe reconciliation.

use std::fmt;

use crafthook_common::{Identifier, IdentifierError};
use thiserror::Error;

/// Error type returned by listeners. Any error can be boxed into it with `?`.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Reload phase a listener belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Adding new recipes
    Add,
    /// Replacing loaded recipes
    Modify,
    /// Removing recipes
    Remove,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building or reconciling recipe sets.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Identifier already present in a registry that rejects duplicates
    #[error("Cannot register {0} as another recipe with the same identifier already exists")]
    DuplicateIdentifier(Identifier),

    /// A recipe factory or replacement produced a recipe under another id
    #[error("Expected recipe {expected}, got {actual}")]
    IdentifierMismatch {
        /// Identifier the caller asked for
        expected: Identifier,
        /// Identifier of the recipe actually supplied
        actual: Identifier,
    },

    /// Serializer id not present in the serializer registry
    #[error("Unknown recipe serializer: {0}")]
    UnknownSerializer(Identifier),

    /// Serializer registered twice
    #[error("Recipe serializer {0} is already registered")]
    DuplicateSerializer(Identifier),

    /// Raw recipe data could not be decoded
    #[error("Malformed recipe {id}: {reason}")]
    Malformed {
        /// Recipe being decoded
        id: Identifier,
        /// What was wrong with it
        reason: String,
    },

    /// Invalid identifier inside recipe data
    #[error("Invalid identifier: {0}")]
    Identifier(#[from] IdentifierError),

    /// A listener returned an error, aborting the reload
    #[error("{phase} listener {listener} failed: {source}")]
    Listener {
        /// Phase the listener ran in
        phase: Phase,
        /// Listener name
        listener: String,
        /// Error returned by the listener
        #[source]
        source: ListenerError,
    },

    /// Registry context read outside a reload cycle
    #[error("No registry context is active")]
    NoActiveContext,

    /// A reload started while another was still running
    #[error("A recipe reload cycle is already in progress")]
    CycleInProgress,

    /// Global and category views disagree
    #[error("Recipe set is inconsistent: {0}")]
    Inconsistent(String),

    /// Failure producing a recipe document
    #[error("Failed to serialize recipe {id}: {source}")]
    Serialize {
        /// Recipe being serialized
        id: Identifier,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for recipe operations.
pub type RecipeResult<T> = Result<T, RecipeError>;
