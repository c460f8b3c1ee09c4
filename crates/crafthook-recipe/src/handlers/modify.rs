//! Modify-phase handle.

use std::sync::Arc;

use crafthook_common::{Identifier, RecipeCategory};
use tracing::debug;

use crate::context::RegistryContext;
use crate::error::{RecipeError, RecipeResult};
use crate::recipe::Recipe;
use crate::set::RecipeSet;

/// Handle through which modify listeners replace existing recipes.
pub struct ModifyRecipeHandler<'a> {
    set: &'a mut RecipeSet,
    previous: Option<&'a RecipeSet>,
    context: &'a RegistryContext,
    debug: bool,
    modified: usize,
}

impl<'a> ModifyRecipeHandler<'a> {
    pub(crate) fn new(
        set: &'a mut RecipeSet,
        previous: Option<&'a RecipeSet>,
        context: &'a RegistryContext,
        debug: bool,
    ) -> Self {
        Self {
            set,
            previous,
            context,
            debug,
            modified: 0,
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

    /// Iterates the recipes currently in a category.
    pub fn recipes_in(&self, category: &RecipeCategory) -> impl Iterator<Item = &Recipe> {
        self.set.category(category).map(AsRef::as_ref)
    }

    /// Iterates all recipes currently in the set.
    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.set.iter().map(AsRef::as_ref)
    }

    /// Returns the set committed by the previous reload, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&RecipeSet> {
        self.previous
    }

    /// Returns the registry context of this reload.
    #[must_use]
    pub fn context(&self) -> &RegistryContext {
        self.context
    }

    /// Replaces the recipe stored under `id`.
    ///
    /// Returns `Ok(false)` without changes if `id` is absent. A recipe whose
    /// category differs from the old one moves to the new category. Fails if
    /// `recipe` carries a different identifier.
    pub fn replace(&mut self, id: &Identifier, recipe: Recipe) -> RecipeResult<bool> {
        if recipe.id() != id {
            return Err(RecipeError::IdentifierMismatch {
                expected: id.clone(),
                actual: recipe.id().clone(),
            });
        }

        let category = recipe.category().clone();
        match self.set.replace(Arc::new(recipe)) {
            Some(old) => {
                if self.debug {
                    debug!(
                        "Modified recipe {} ({} -> {})",
                        id,
                        old.category(),
                        category
                    );
                }
                self.modified += 1;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Returns how many recipes have been replaced so far.
    #[must_use]
    pub fn modified(&self) -> usize {
        self.modified
    }
}
