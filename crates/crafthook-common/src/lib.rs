//! # Crafthook Common
//!
//! Common types shared by the crafthook crates.
//!
//! This crate provides:
//! - Namespaced identifiers for recipes, serializers and registries
//! - Recipe category tags
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
}

pub use prelude::*;
