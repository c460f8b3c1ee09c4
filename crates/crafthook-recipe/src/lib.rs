//! # Crafthook Recipe
//!
//! Recipe-set reconciliation for a crafting engine's resource reload.
//!
//! Each reload takes the freshly loaded base recipes and runs three phases of
//! extension listeners over them:
//! - Add: listeners insert new recipes, then static recipes are replayed,
//!   then the base data is merged; the first writer of an identifier wins
//! - Modify: listeners replace existing recipes in place
//! - Remove: listeners delete recipes
//!
//! The result is an immutable [`RecipeSet`] indexed both globally and per
//! category. An optional debug dump writes every recipe back out as JSON.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod builtin;
pub mod config;
pub mod context;
pub mod dump;
pub mod error;
pub mod events;
pub mod handlers;
pub mod manager;
pub mod recipe;
pub mod set;
pub mod statics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::RecipeConfig;
    pub use crate::context::{ContextScope, ContextTracker, RegistryContext};
    pub use crate::dump::{DumpSummary, RecipeDumper};
    pub use crate::error::{ListenerError, Phase, RecipeError, RecipeResult};
    pub use crate::events::{AddRecipes, ListenerResult, ModifyRecipes, RecipeLoadingEvents, RemoveRecipes};
    pub use crate::handlers::{ModifyRecipeHandler, RegisterRecipeHandler, RemoveRecipeHandler};
    pub use crate::manager::{RecipeManager, ReloadReport};
    pub use crate::recipe::{
        Recipe, RecipeDocumentWriter, RecipeSerializer, Reserialization, SerializerRegistry,
    };
    pub use crate::set::RecipeSet;
    pub use crate::statics::{register_static_recipe, StaticRecipeRegistry};
    pub use crafthook_common::{Identifier, RecipeCategory};
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::tests::opaque;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn id(s: &str) -> Identifier {
        s.parse().expect("valid id")
    }

    fn manager(events: impl FnOnce(&mut RecipeLoadingEvents)) -> RecipeManager {
        RecipeManager::builder()
            .config(RecipeConfig {
                development: false,
                ..RecipeConfig::default()
            })
            .static_registry(Arc::new(StaticRecipeRegistry::new()))
            .listeners(events)
            .build()
    }

    fn base(ids: &[&str]) -> BTreeMap<Identifier, Recipe> {
        ids.iter()
            .map(|s| (id(s), opaque(s, "core:crafting")))
            .collect()
    }

    #[test]
    fn test_listener_error_aborts_and_releases_context() {
        let manager = manager(|events| {
            events.on_remove(|_handler| Err("broken extension".into()));
        });

        let err = manager
            .reload(base(&["core:plank"]), RegistryContext::new())
            .expect_err("listener failure propagates");
        assert!(matches!(
            err,
            RecipeError::Listener {
                phase: Phase::Remove,
                ..
            }
        ));
        assert!(manager.live().is_none());

        // The context was released, so the next cycle starts and fails the
        // same way instead of with CycleInProgress.
        let err = manager
            .reload(base(&["core:plank"]), RegistryContext::new())
            .expect_err("listener still fails");
        assert!(matches!(err, RecipeError::Listener { .. }));
    }

    #[test]
    fn test_failed_reload_keeps_previous_live_set() {
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&fail);
        let manager = manager(move |events| {
            events.on_modify(move |_handler| {
                if flag.load(std::sync::atomic::Ordering::SeqCst) {
                    Err("modify failed".into())
                } else {
                    Ok(())
                }
            });
        });

        let first = manager
            .reload(base(&["core:plank"]), RegistryContext::new())
            .expect("first reload");
        fail.store(true, std::sync::atomic::Ordering::SeqCst);

        let err = manager
            .reload(base(&["core:stick"]), RegistryContext::new())
            .expect_err("second reload fails");
        assert!(!matches!(err, RecipeError::CycleInProgress));

        let live = manager.live().expect("still live");
        assert!(Arc::ptr_eq(&live, &first.set));
    }

    #[test]
    fn test_reload_staged_consumes_context() {
        let manager = manager(|_| {});
        assert!(matches!(
            manager.reload_staged(BTreeMap::new()),
            Err(RecipeError::NoActiveContext)
        ));

        manager.on_registry_setup(RegistryContext::new());
        manager
            .reload_staged(base(&["core:plank"]))
            .expect("staged reload");
        assert!(matches!(
            manager.reload_staged(BTreeMap::new()),
            Err(RecipeError::NoActiveContext)
        ));
    }

    #[test]
    fn test_listeners_see_context() {
        let manager = manager(|events| {
            events.on_add(|handler| {
                let item = id("core:item");
                if handler.context().contains(&item, &id("mod:gear")) {
                    handler.register(opaque("mod:gear", "core:crafting"));
                }
                Ok(())
            });
        });

        let context = RegistryContext::builder()
            .entry(id("core:item"), id("mod:gear"))
            .build();
        let report = manager.reload(BTreeMap::new(), context).expect("reload");
        assert!(report.set.contains(&id("mod:gear")));

        let report = manager
            .reload(BTreeMap::new(), RegistryContext::new())
            .expect("reload");
        assert!(report.set.is_empty());
    }
}
