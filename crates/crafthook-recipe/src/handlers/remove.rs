//! Remove-phase handle.

use crafthook_common::{Identifier, RecipeCategory};
use tracing::debug;

use crate::context::RegistryContext;
use crate::recipe::Recipe;
use crate::set::RecipeSet;

/// Handle through which remove listeners delete recipes.
pub struct RemoveRecipeHandler<'a> {
    set: &'a mut RecipeSet,
    context: &'a RegistryContext,
    debug: bool,
    removed: usize,
}

impl<'a> RemoveRecipeHandler<'a> {
    pub(crate) fn new(set: &'a mut RecipeSet, context: &'a RegistryContext, debug: bool) -> Self {
        Self {
            set,
            context,
            debug,
            removed: 0,
        }
    }

    /// Gets a recipe by identifier.
    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<&Recipe> {
        self.set.get(id).map(AsRef::as_ref)
    }

    /// Returns true if a recipe with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.set.contains(id)
    }

    /// Returns the registry context of this reload.
    #[must_use]
    pub fn context(&self) -> &RegistryContext {
        self.context
    }

    /// Removes a recipe. Returns false if it did not exist.
    pub fn remove(&mut self, id: &Identifier) -> bool {
        if self.set.remove(id).is_none() {
            return false;
        }

        if self.debug {
            debug!("Removed recipe {}", id);
        }
        self.removed += 1;
        true
    }

    /// Removes every recipe matching the predicate. Returns how many went.
    pub fn remove_if<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&Recipe) -> bool,
    {
        let doomed: Vec<Identifier> = self
            .set
            .iter()
            .filter(|r| predicate(r))
            .map(|r| r.id().clone())
            .collect();
        self.remove_all(&doomed)
    }

    /// Removes every recipe of `category` matching the predicate.
    pub fn remove_if_in<P>(&mut self, category: &RecipeCategory, mut predicate: P) -> usize
    where
        P: FnMut(&Recipe) -> bool,
    {
        let doomed: Vec<Identifier> = self
            .set
            .category(category)
            .filter(|r| predicate(r))
            .map(|r| r.id().clone())
            .collect();
        self.remove_all(&doomed)
    }

    fn remove_all(&mut self, ids: &[Identifier]) -> usize {
        ids.iter().filter(|id| self.remove(id)).count()
    }

    /// Returns how many recipes have been removed so far.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.removed
    }
}
