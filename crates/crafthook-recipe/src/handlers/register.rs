//! Add-phase handle.

use std::collections::BTreeMap;
use std::sync::Arc;

use crafthook_common::Identifier;
use tracing::{debug, error};

use crate::context::RegistryContext;
use crate::error::{RecipeError, RecipeResult};
use crate::recipe::Recipe;
use crate::set::RecipeSet;

/// Counts produced by the add phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Recipes accepted from listeners and the static registry
    pub registered: usize,
    /// Recipes accepted from the base data
    pub base_loaded: usize,
    /// Entries dropped because their identifier was taken
    pub rejected: usize,
}

/// Handle through which add listeners insert recipes.
///
/// The first recipe inserted under an identifier wins; later ones are logged
/// and dropped. Listeners run first, then static recipes, then the base data.
pub struct RegisterRecipeHandler<'a> {
    set: &'a mut RecipeSet,
    context: &'a RegistryContext,
    debug: bool,
    registered: usize,
    rejected: usize,
}

impl<'a> RegisterRecipeHandler<'a> {
    pub(crate) fn new(set: &'a mut RecipeSet, context: &'a RegistryContext, debug: bool) -> Self {
        Self {
            set,
            context,
            debug,
            registered: 0,
            rejected: 0,
        }
    }

    /// Registers a recipe. Returns false if the identifier was already taken.
    pub fn register(&mut self, recipe: Recipe) -> bool {
        self.accept(Arc::new(recipe), "extension")
    }

    /// Registers the recipe built by `factory` under `id`.
    ///
    /// Fails if the factory builds a recipe with a different identifier.
    pub fn register_with<F>(&mut self, id: Identifier, factory: F) -> RecipeResult<bool>
    where
        F: FnOnce(&Identifier) -> Recipe,
    {
        let recipe = factory(&id);
        if recipe.id() != &id {
            return Err(RecipeError::IdentifierMismatch {
                expected: id,
                actual: recipe.id().clone(),
            });
        }
        Ok(self.register(recipe))
    }

    /// Returns true if a recipe with this identifier was already added.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.set.contains(id)
    }

    /// Returns the registry context of this reload.
    #[must_use]
    pub fn context(&self) -> &RegistryContext {
        self.context
    }

    /// Returns how many recipes have been accepted so far.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.registered
    }

    pub(crate) fn register_static(&mut self, recipe: Arc<Recipe>) -> bool {
        self.accept(recipe, "static")
    }

    fn accept(&mut self, recipe: Arc<Recipe>, source: &str) -> bool {
        if self.insert(recipe, source) {
            self.registered += 1;
            true
        } else {
            false
        }
    }

    /// Merges the base data and finishes the phase.
    pub(crate) fn merge_base(mut self, base: BTreeMap<Identifier, Recipe>) -> LoadOutcome {
        let mut base_loaded = 0;

        for (id, recipe) in base {
            if recipe.id() != &id {
                error!(
                    "Base recipe keyed {} carries identifier {}, dropping it",
                    id,
                    recipe.id()
                );
                self.rejected += 1;
                continue;
            }
            if self.insert(Arc::new(recipe), "base") {
                base_loaded += 1;
            }
        }

        LoadOutcome {
            registered: self.registered,
            base_loaded,
            rejected: self.rejected,
        }
    }

    fn insert(&mut self, recipe: Arc<Recipe>, source: &str) -> bool {
        if self.debug {
            debug!(
                "Adding {} recipe {} with category {}",
                source,
                recipe.id(),
                recipe.category()
            );
        }

        match self.set.insert_new(recipe) {
            Ok(()) => true,
            Err(recipe) => {
                error!(
                    "Cannot add {} recipe {}: another recipe with the same identifier was added first",
                    source,
                    recipe.id()
                );
                self.rejected += 1;
                false
            },
        }
    }
}
