//! Process-wide table of static recipes.
//!
//! Extensions register compile-time-known recipes here during initialization.
//! Every reload replays them into the new recipe set.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crafthook_common::Identifier;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{RecipeError, RecipeResult};
use crate::recipe::Recipe;

static GLOBAL: OnceLock<Arc<StaticRecipeRegistry>> = OnceLock::new();

/// Append-only table of static recipes keyed by identifier.
#[derive(Debug, Default)]
pub struct StaticRecipeRegistry {
    recipes: RwLock<BTreeMap<Identifier, Arc<Recipe>>>,
}

impl StaticRecipeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static Arc<Self> {
        GLOBAL.get_or_init(|| Arc::new(Self::new()))
    }

    /// Registers a static recipe.
    ///
    /// Fails if the identifier is already registered; the existing entry is
    /// left untouched.
    pub fn register(&self, recipe: Recipe) -> RecipeResult<()> {
        let mut recipes = self.recipes.write();
        if recipes.contains_key(recipe.id()) {
            return Err(RecipeError::DuplicateIdentifier(recipe.id().clone()));
        }

        debug!("Registered static recipe {}", recipe.id());
        recipes.insert(recipe.id().clone(), Arc::new(recipe));
        Ok(())
    }

    /// Returns the number of static recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.read().len()
    }

    /// Returns true if no static recipes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.read().is_empty()
    }

    /// Returns true if the identifier is registered.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.recipes.read().contains_key(id)
    }

    /// Gets a static recipe by identifier.
    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<Arc<Recipe>> {
        self.recipes.read().get(id).cloned()
    }

    /// Copies out all static recipes in identifier order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<Recipe>> {
        self.recipes.read().values().cloned().collect()
    }
}

/// Registers a recipe with the process-wide static registry.
pub fn register_static_recipe(recipe: Recipe) -> RecipeResult<()> {
    StaticRecipeRegistry::global().register(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::tests::opaque;

    #[test]
    fn test_register_and_get() {
        let registry = StaticRecipeRegistry::new();
        registry
            .register(opaque("mod:static_sword", "core:crafting"))
            .expect("register");

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&"mod:static_sword".parse().expect("id")));
    }

    #[test]
    fn test_duplicate_leaves_first_registration() {
        let registry = StaticRecipeRegistry::new();
        registry
            .register(opaque("mod:static_sword", "core:crafting"))
            .expect("register");

        let result = registry.register(opaque("mod:static_sword", "core:smithing"));
        assert!(matches!(result, Err(RecipeError::DuplicateIdentifier(_))));

        let kept = registry
            .get(&"mod:static_sword".parse().expect("id"))
            .expect("still present");
        assert_eq!(kept.category().to_string(), "core:crafting");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let registry = StaticRecipeRegistry::new();
        for id in ["mod:c", "mod:a", "mod:b"] {
            registry
                .register(opaque(id, "core:crafting"))
                .expect("register");
        }

        let ids: Vec<String> = registry
            .snapshot()
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, ["mod:a", "mod:b", "mod:c"]);
    }

    #[test]
    fn test_global_function_rejects_duplicates() {
        // Unique id: the global registry is shared by every test in the process.
        register_static_recipe(opaque("statics_test:global_once", "core:crafting"))
            .expect("first registration");
        assert!(matches!(
            register_static_recipe(opaque("statics_test:global_once", "core:crafting")),
            Err(RecipeError::DuplicateIdentifier(_))
        ));
        assert!(StaticRecipeRegistry::global().contains(&"statics_test:global_once".parse().expect("id")));
    }
}
