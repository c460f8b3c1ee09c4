//! Reload orchestration.
//!
//! One reload cycle runs the add, modify and remove phases in order against a
//! fresh [`RecipeSet`], checks the set after each phase, installs it as the
//! live set and optionally dumps it. The registry context is held for exactly
//! the duration of the cycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use crafthook_common::Identifier;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::RecipeConfig;
use crate::context::{ContextTracker, RegistryContext};
use crate::dump::{DumpSummary, RecipeDumper};
use crate::error::{Phase, RecipeError, RecipeResult};
use crate::events::RecipeLoadingEvents;
use crate::handlers::{LoadOutcome, ModifyRecipeHandler, RegisterRecipeHandler, RemoveRecipeHandler};
use crate::recipe::{Recipe, SerializerRegistry};
use crate::set::RecipeSet;
use crate::statics::StaticRecipeRegistry;

/// What one reload produced.
#[derive(Debug, Clone)]
pub struct ReloadReport {
    /// The committed recipe set
    pub set: Arc<RecipeSet>,
    /// Recipes added by listeners and the static registry
    pub added: usize,
    /// Recipes taken from the base data
    pub base_loaded: usize,
    /// Entries dropped for identifier collisions
    pub rejected: usize,
    /// Recipes replaced by modify listeners
    pub modified: usize,
    /// Recipes deleted by remove listeners
    pub removed: usize,
    /// Dump counts, if the dump ran
    pub dump: Option<DumpSummary>,
}

/// Builder for [`RecipeManager`].
#[derive(Debug, Default)]
pub struct RecipeManagerBuilder {
    config: Option<RecipeConfig>,
    serializers: Option<Arc<SerializerRegistry>>,
    statics: Option<Arc<StaticRecipeRegistry>>,
    events: RecipeLoadingEvents,
}

impl RecipeManagerBuilder {
    /// Sets the configuration. Defaults to [`RecipeConfig::process`].
    #[must_use]
    pub fn config(mut self, config: RecipeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the serializer registry. Defaults to the built-ins.
    #[must_use]
    pub fn serializers(mut self, serializers: Arc<SerializerRegistry>) -> Self {
        self.serializers = Some(serializers);
        self
    }

    /// Sets the static registry. Defaults to the process-wide one.
    #[must_use]
    pub fn static_registry(mut self, statics: Arc<StaticRecipeRegistry>) -> Self {
        self.statics = Some(statics);
        self
    }

    /// Registers listeners.
    #[must_use]
    pub fn listeners(mut self, register: impl FnOnce(&mut RecipeLoadingEvents)) -> Self {
        register(&mut self.events);
        self
    }

    /// Builds the manager.
    #[must_use]
    pub fn build(self) -> RecipeManager {
        let (add, modify, remove) = self.events.counts();
        debug!(
            "Recipe manager built with {} add, {} modify, {} remove listeners",
            add, modify, remove
        );

        RecipeManager {
            config: self.config.unwrap_or_else(|| RecipeConfig::process().clone()),
            serializers: self
                .serializers
                .unwrap_or_else(|| Arc::new(SerializerRegistry::with_builtins())),
            statics: self
                .statics
                .unwrap_or_else(|| Arc::clone(StaticRecipeRegistry::global())),
            events: self.events,
            tracker: ContextTracker::new(),
            staged: Mutex::new(None),
            live: RwLock::new(None),
        }
    }
}

/// Runs reload cycles and holds the live recipe set.
#[derive(Debug)]
pub struct RecipeManager {
    config: RecipeConfig,
    serializers: Arc<SerializerRegistry>,
    statics: Arc<StaticRecipeRegistry>,
    events: RecipeLoadingEvents,
    tracker: ContextTracker,
    staged: Mutex<Option<RegistryContext>>,
    live: RwLock<Option<Arc<RecipeSet>>>,
}

impl RecipeManager {
    /// Creates a manager builder.
    #[must_use]
    pub fn builder() -> RecipeManagerBuilder {
        RecipeManagerBuilder::default()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &RecipeConfig {
        &self.config
    }

    /// Returns the serializer registry.
    #[must_use]
    pub fn serializers(&self) -> &SerializerRegistry {
        &self.serializers
    }

    /// Returns the static registry replayed on every reload.
    #[must_use]
    pub fn static_registry(&self) -> &StaticRecipeRegistry {
        &self.statics
    }

    /// Returns the live recipe set, if a reload has completed.
    #[must_use]
    pub fn live(&self) -> Option<Arc<RecipeSet>> {
        self.live.read().clone()
    }

    /// Stages the context for the next [`reload_staged`](Self::reload_staged).
    ///
    /// Hosts call this from their registry setup callback.
    pub fn on_registry_setup(&self, context: RegistryContext) {
        debug!("Registry context staged for next recipe reload");
        *self.staged.lock() = Some(context);
    }

    /// Reloads with the context staged by [`on_registry_setup`](Self::on_registry_setup).
    ///
    /// The staged context is consumed.
    pub fn reload_staged(&self, base: BTreeMap<Identifier, Recipe>) -> RecipeResult<ReloadReport> {
        let context = self.staged.lock().take().ok_or(RecipeError::NoActiveContext)?;
        self.reload(base, context)
    }

    /// Runs one reload cycle over freshly loaded base recipes.
    ///
    /// On a listener error the cycle aborts, the live set is left as it was
    /// and the context is released.
    pub fn reload(
        &self,
        base: BTreeMap<Identifier, Recipe>,
        context: RegistryContext,
    ) -> RecipeResult<ReloadReport> {
        let scope = self.tracker.begin(Arc::new(context))?;
        let context = scope.context();
        let debug = self.config.debug;
        let previous = self.live();

        let mut set = RecipeSet::new();
        let outcome = self.apply_additions(&mut set, base, context)?;
        check_phase(&set, Phase::Add)?;
        info!("Registered {} custom recipes.", outcome.registered);

        let mut handler = ModifyRecipeHandler::new(&mut set, previous.as_deref(), context, debug);
        self.events.invoke_modify(&mut handler)?;
        let modified = handler.modified();
        check_phase(&set, Phase::Modify)?;
        info!("Modified {} recipes.", modified);

        let mut handler = RemoveRecipeHandler::new(&mut set, context, debug);
        self.events.invoke_remove(&mut handler)?;
        let removed = handler.removed();
        check_phase(&set, Phase::Remove)?;
        info!("Removed {} recipes.", removed);

        let set = Arc::new(set);
        *self.live.write() = Some(Arc::clone(&set));

        let dump = self
            .config
            .dump
            .then(|| RecipeDumper::new(&self.config.dump_dir).dump(&set));

        if self.config.warnings_enabled() {
            self.warn_incompatible_serializers();
        }

        drop(scope);

        Ok(ReloadReport {
            set,
            added: outcome.registered,
            base_loaded: outcome.base_loaded,
            rejected: outcome.rejected,
            modified,
            removed,
            dump,
        })
    }

    fn apply_additions(
        &self,
        set: &mut RecipeSet,
        base: BTreeMap<Identifier, Recipe>,
        context: &RegistryContext,
    ) -> RecipeResult<LoadOutcome> {
        let mut handler = RegisterRecipeHandler::new(set, context, self.config.debug);
        self.events.invoke_add(&mut handler)?;

        for recipe in self.statics.snapshot() {
            handler.register_static(recipe);
        }

        Ok(handler.merge_base(base))
    }

    fn warn_incompatible_serializers(&self) {
        for id in self.serializers.without_reserialization() {
            warn!(
                "Recipe serializer {} doesn't support re-serialization. For full compatibility, the capability should be implemented.",
                id
            );
        }
    }
}

fn check_phase(set: &RecipeSet, phase: Phase) -> RecipeResult<()> {
    set.check_consistency().map_err(|e| {
        error!("Recipe set inconsistent after {} phase: {}", phase, e);
        e
    })
}
