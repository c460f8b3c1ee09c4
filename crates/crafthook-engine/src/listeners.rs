//! Configuration-driven listeners.
//!
//! Lets a server operator disable recipes or move them to another category
//! from `crafthook.toml`, without writing an extension.

use std::collections::BTreeMap;

use crafthook_common::{Identifier, RecipeCategory};
use crafthook_recipe::events::{ListenerResult, ModifyRecipes, RecipeLoadingEvents, RemoveRecipes};
use crafthook_recipe::handlers::{ModifyRecipeHandler, RemoveRecipeHandler};
use tracing::{debug, warn};

use crate::config::HostConfig;

/// Removes the listed recipes.
#[derive(Debug, Clone, Default)]
pub struct DisabledRecipes {
    ids: Vec<Identifier>,
}

impl DisabledRecipes {
    /// Creates the listener.
    #[must_use]
    pub fn new(ids: Vec<Identifier>) -> Self {
        Self { ids }
    }
}

impl RemoveRecipes for DisabledRecipes {
    fn remove_recipes(&self, handler: &mut RemoveRecipeHandler<'_>) -> ListenerResult {
        for id in &self.ids {
            if handler.remove(id) {
                debug!("Disabled recipe {}", id);
            } else {
                warn!("Disabled recipe {} is not loaded", id);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "disabled_recipes"
    }
}

/// Moves recipes to another category.
#[derive(Debug, Clone, Default)]
pub struct CategoryOverrides {
    overrides: BTreeMap<Identifier, RecipeCategory>,
}

impl CategoryOverrides {
    /// Creates the listener.
    #[must_use]
    pub fn new(overrides: BTreeMap<Identifier, RecipeCategory>) -> Self {
        Self { overrides }
    }
}

impl ModifyRecipes for CategoryOverrides {
    fn modify_recipes(&self, handler: &mut ModifyRecipeHandler<'_>) -> ListenerResult {
        for (id, category) in &self.overrides {
            let recipe = match handler.get(id) {
                Some(recipe) if recipe.category() == category => continue,
                Some(recipe) => recipe.clone(),
                None => {
                    warn!("Category override for {} matches no loaded recipe", id);
                    continue;
                },
            };
            handler.replace(id, recipe.with_category(category.clone()))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "category_overrides"
    }
}

/// Registers the listeners the host configuration asks for.
pub fn install(events: &mut RecipeLoadingEvents, config: &HostConfig) {
    if !config.category_overrides.is_empty() {
        events.register_modify(CategoryOverrides::new(config.category_overrides.clone()));
    }
    if !config.disabled_recipes.is_empty() {
        events.register_remove(DisabledRecipes::new(config.disabled_recipes.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crafthook_recipe::manager::RecipeManager;
    use crafthook_recipe::recipe::{Recipe, SerializerRegistry};
    use crafthook_recipe::statics::StaticRecipeRegistry;
    use crafthook_recipe::context::RegistryContext;
    use serde_json::json;
    use std::sync::Arc;

    fn id(s: &str) -> Identifier {
        s.parse().expect("valid id")
    }

    fn base(serializers: &SerializerRegistry) -> BTreeMap<Identifier, Recipe> {
        let mut base = BTreeMap::new();
        for (name, kind) in [
            ("core:dye", "core:crafting_special_armordye"),
            ("core:repair", "core:crafting_special_repairitem"),
        ] {
            let recipe = serializers
                .decode(id(name), json!({ "type": kind }))
                .expect("decode");
            base.insert(id(name), recipe);
        }
        base
    }

    #[test]
    fn test_configured_listeners_apply() {
        let mut config = HostConfig {
            disabled_recipes: vec![id("core:repair"), id("core:missing")],
            ..HostConfig::default()
        };
        config.recipe.development = false;
        config
            .category_overrides
            .insert(id("core:dye"), "core:dyeing".parse().expect("category"));

        let serializers = Arc::new(SerializerRegistry::with_builtins());
        let manager = RecipeManager::builder()
            .config(config.recipe.clone())
            .serializers(Arc::clone(&serializers))
            .static_registry(Arc::new(StaticRecipeRegistry::new()))
            .listeners(|events| install(events, &config))
            .build();

        let report = manager
            .reload(base(&serializers), RegistryContext::new())
            .expect("reload");

        assert_eq!(report.removed, 1);
        assert_eq!(report.modified, 1);
        let dye = report.set.get(&id("core:dye")).expect("dye kept");
        assert_eq!(dye.category().to_string(), "core:dyeing");
        assert!(!report.set.contains(&id("core:repair")));
    }

    #[test]
    fn test_override_to_same_category_is_not_a_modification() {
        let serializers = SerializerRegistry::with_builtins();
        let mut overrides = BTreeMap::new();
        overrides.insert(id("core:dye"), "core:crafting".parse().expect("category"));

        let manager = RecipeManager::builder()
            .config(HostConfig::default().recipe)
            .static_registry(Arc::new(StaticRecipeRegistry::new()))
            .listeners(|events| {
                events.register_modify(CategoryOverrides::new(overrides));
            })
            .build();

        let report = manager
            .reload(base(&serializers), RegistryContext::new())
            .expect("reload");
        assert_eq!(report.modified, 0);
    }
}
