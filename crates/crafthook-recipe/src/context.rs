//! Registry context for one reload cycle.
//!
//! A [`RegistryContext`] is the snapshot of dynamic registries (items, tags,
//! and so on) listeners resolve against while recipes reload. It is passed to
//! every handler explicitly. The [`ContextTracker`] guarantees that at most
//! one context is live at a time and that it is released when the cycle ends,
//! whichever way it ends.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crafthook_common::Identifier;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecipeError, RecipeResult};

/// Dynamic registry entries, keyed by registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryContext {
    registries: BTreeMap<Identifier, BTreeSet<Identifier>>,
}

impl RegistryContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context builder.
    #[must_use]
    pub fn builder() -> RegistryContextBuilder {
        RegistryContextBuilder::default()
    }

    /// Returns true if `id` is an entry of `registry`.
    #[must_use]
    pub fn contains(&self, registry: &Identifier, id: &Identifier) -> bool {
        self.registries
            .get(registry)
            .is_some_and(|entries| entries.contains(id))
    }

    /// Iterates the entries of a registry in order.
    pub fn entries(&self, registry: &Identifier) -> impl Iterator<Item = &Identifier> {
        self.registries.get(registry).into_iter().flatten()
    }

    /// Iterates the registry keys in order.
    pub fn registries(&self) -> impl Iterator<Item = &Identifier> {
        self.registries.keys()
    }

    /// Returns true if no registry has entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registries.values().all(BTreeSet::is_empty)
    }
}

/// Builder for [`RegistryContext`].
#[derive(Debug, Default)]
pub struct RegistryContextBuilder {
    registries: BTreeMap<Identifier, BTreeSet<Identifier>>,
}

impl RegistryContextBuilder {
    /// Adds one entry to a registry.
    #[must_use]
    pub fn entry(mut self, registry: Identifier, id: Identifier) -> Self {
        self.registries.entry(registry).or_default().insert(id);
        self
    }

    /// Adds several entries to a registry.
    #[must_use]
    pub fn entries(mut self, registry: Identifier, ids: impl IntoIterator<Item = Identifier>) -> Self {
        self.registries.entry(registry).or_default().extend(ids);
        self
    }

    /// Builds the context.
    #[must_use]
    pub fn build(self) -> RegistryContext {
        RegistryContext {
            registries: self.registries,
        }
    }
}

/// Single slot holding the context of the reload in flight.
#[derive(Debug, Default)]
pub struct ContextTracker {
    slot: Mutex<Option<Arc<RegistryContext>>>,
}

impl ContextTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a cycle with the given context.
    ///
    /// The returned scope clears the slot when dropped. Fails if another
    /// cycle is still active.
    pub fn begin(&self, context: Arc<RegistryContext>) -> RecipeResult<ContextScope<'_>> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(RecipeError::CycleInProgress);
        }

        *slot = Some(Arc::clone(&context));
        debug!("Registry context acquired");
        Ok(ContextScope {
            tracker: self,
            context,
        })
    }

    /// Returns the active context.
    ///
    /// Reading outside a cycle is a programming error; debug builds panic.
    pub fn current(&self) -> RecipeResult<Arc<RegistryContext>> {
        let current = self.slot.lock().clone();
        debug_assert!(
            current.is_some(),
            "registry context read outside a reload cycle"
        );
        current.ok_or(RecipeError::NoActiveContext)
    }

    /// Returns true while a cycle holds the slot.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }

    fn end(&self) {
        *self.slot.lock() = None;
        debug!("Registry context released");
    }
}

/// Guard for an active cycle; releases the context on drop.
#[derive(Debug)]
pub struct ContextScope<'a> {
    tracker: &'a ContextTracker,
    context: Arc<RegistryContext>,
}

impl ContextScope<'_> {
    /// Returns the context of this cycle.
    #[must_use]
    pub fn context(&self) -> &RegistryContext {
        &self.context
    }
}

impl Drop for ContextScope<'_> {
    fn drop(&mut self) {
        self.tracker.end();
    }
}
