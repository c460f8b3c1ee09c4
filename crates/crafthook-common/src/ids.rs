//! Identifier types for recipes and their categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{IdentifierError, IdentifierResult};

/// Namespace used when an identifier is written without one.
pub const DEFAULT_NAMESPACE: &str = "core";

/// Namespaced identifier such as `mymod:custom_sword`.
///
/// Ordering is by namespace, then path, so maps keyed by identifiers iterate
/// in a stable order across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    /// Creates an identifier from its two parts, validating both.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> IdentifierResult<Self> {
        let namespace = namespace.into();
        let path = path.into();
        let display = format!("{namespace}:{path}");

        if namespace.is_empty() {
            return Err(IdentifierError::EmptyNamespace(display));
        }
        if path.is_empty() {
            return Err(IdentifierError::EmptyPath(display));
        }
        if let Some(ch) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(IdentifierError::InvalidChar { input: display, ch });
        }
        if let Some(ch) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(IdentifierError::InvalidChar { input: display, ch });
        }
        if let Some(segment) = path
            .split('/')
            .find(|s| s.is_empty() || *s == "." || *s == "..")
        {
            return Err(IdentifierError::InvalidSegment {
                segment: segment.to_string(),
                input: display,
            });
        }

        Ok(Self { namespace, path })
    }

    /// Creates an identifier in the default `core` namespace.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid identifier path. Intended for
    /// compile-time-known literals.
    #[must_use]
    pub fn core(path: &str) -> Self {
        Self::new(DEFAULT_NAMESPACE, path).expect("invalid core identifier literal")
    }

    /// Returns the namespace part.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the path part.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

const fn is_namespace_char(c: char) -> bool {
    matches!(c, 'a'..='z' | '0'..='9' | '_' | '.' | '-')
}

const fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }
}

impl TryFrom<String> for Identifier {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Category tag deciding which crafting subsystem consumes a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeCategory(Identifier);

impl RecipeCategory {
    /// Creates a category from its identifier.
    #[must_use]
    pub const fn new(id: Identifier) -> Self {
        Self(id)
    }

    /// Returns the category identifier.
    #[must_use]
    pub const fn id(&self) -> &Identifier {
        &self.0
    }
}

impl FromStr for RecipeCategory {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for RecipeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
