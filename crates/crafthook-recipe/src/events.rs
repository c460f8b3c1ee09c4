//! Listener registration for the add, modify and remove phases.
//!
//! Listeners run in registration order, each seeing the effect of the ones
//! before it. A listener error aborts the reload.

use tracing::debug;

use crate::error::{ListenerError, Phase, RecipeError, RecipeResult};
use crate::handlers::{ModifyRecipeHandler, RegisterRecipeHandler, RemoveRecipeHandler};

/// Result returned by listeners.
pub type ListenerResult = Result<(), ListenerError>;

/// Listener for the add phase.
pub trait AddRecipes: Send + Sync {
    /// Adds recipes through the handler.
    fn add_recipes(&self, handler: &mut RegisterRecipeHandler<'_>) -> ListenerResult;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Listener for the modify phase.
pub trait ModifyRecipes: Send + Sync {
    /// Replaces recipes through the handler.
    fn modify_recipes(&self, handler: &mut ModifyRecipeHandler<'_>) -> ListenerResult;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Listener for the remove phase.
pub trait RemoveRecipes: Send + Sync {
    /// Removes recipes through the handler.
    fn remove_recipes(&self, handler: &mut RemoveRecipeHandler<'_>) -> ListenerResult;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> AddRecipes for F
where
    F: Fn(&mut RegisterRecipeHandler<'_>) -> ListenerResult + Send + Sync,
{
    fn add_recipes(&self, handler: &mut RegisterRecipeHandler<'_>) -> ListenerResult {
        self(handler)
    }
}

impl<F> ModifyRecipes for F
where
    F: Fn(&mut ModifyRecipeHandler<'_>) -> ListenerResult + Send + Sync,
{
    fn modify_recipes(&self, handler: &mut ModifyRecipeHandler<'_>) -> ListenerResult {
        self(handler)
    }
}

impl<F> RemoveRecipes for F
where
    F: Fn(&mut RemoveRecipeHandler<'_>) -> ListenerResult + Send + Sync,
{
    fn remove_recipes(&self, handler: &mut RemoveRecipeHandler<'_>) -> ListenerResult {
        self(handler)
    }
}

/// Ordered listener lists for the three reload phases.
#[derive(Default)]
pub struct RecipeLoadingEvents {
    add: Vec<Box<dyn AddRecipes>>,
    modify: Vec<Box<dyn ModifyRecipes>>,
    remove: Vec<Box<dyn RemoveRecipes>>,
}

impl RecipeLoadingEvents {
    /// Creates empty listener lists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an add-phase listener.
    pub fn register_add(&mut self, listener: impl AddRecipes + 'static) -> &mut Self {
        self.add.push(Box::new(listener));
        self
    }

    /// Registers a modify-phase listener.
    pub fn register_modify(&mut self, listener: impl ModifyRecipes + 'static) -> &mut Self {
        self.modify.push(Box::new(listener));
        self
    }

    /// Registers a remove-phase listener.
    pub fn register_remove(&mut self, listener: impl RemoveRecipes + 'static) -> &mut Self {
        self.remove.push(Box::new(listener));
        self
    }

    /// Registers a closure as an add-phase listener.
    pub fn on_add<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut RegisterRecipeHandler<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        self.register_add(listener)
    }

    /// Registers a closure as a modify-phase listener.
    pub fn on_modify<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut ModifyRecipeHandler<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        self.register_modify(listener)
    }

    /// Registers a closure as a remove-phase listener.
    pub fn on_remove<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut RemoveRecipeHandler<'_>) -> ListenerResult + Send + Sync + 'static,
    {
        self.register_remove(listener)
    }

    /// Returns the listener counts as (add, modify, remove).
    #[must_use]
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.add.len(), self.modify.len(), self.remove.len())
    }

    pub(crate) fn invoke_add(&self, handler: &mut RegisterRecipeHandler<'_>) -> RecipeResult<()> {
        for listener in &self.add {
            debug!("Invoking add listener {}", listener.name());
            listener
                .add_recipes(handler)
                .map_err(|source| listener_failed(Phase::Add, listener.name(), source))?;
        }
        Ok(())
    }

    pub(crate) fn invoke_modify(&self, handler: &mut ModifyRecipeHandler<'_>) -> RecipeResult<()> {
        for listener in &self.modify {
            debug!("Invoking modify listener {}", listener.name());
            listener
                .modify_recipes(handler)
                .map_err(|source| listener_failed(Phase::Modify, listener.name(), source))?;
        }
        Ok(())
    }

    pub(crate) fn invoke_remove(&self, handler: &mut RemoveRecipeHandler<'_>) -> RecipeResult<()> {
        for listener in &self.remove {
            debug!("Invoking remove listener {}", listener.name());
            listener
                .remove_recipes(handler)
                .map_err(|source| listener_failed(Phase::Remove, listener.name(), source))?;
        }
        Ok(())
    }
}

fn listener_failed(phase: Phase, name: &str, source: ListenerError) -> RecipeError {
    RecipeError::Listener {
        phase,
        listener: name.to_string(),
        source,
    }
}

impl std::fmt::Debug for RecipeLoadingEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeLoadingEvents")
            .field("add", &self.add.iter().map(|l| l.name()).collect::<Vec<_>>())
            .field("modify", &self.modify.iter().map(|l| l.name()).collect::<Vec<_>>())
            .field("remove", &self.remove.iter().map(|l| l.name()).collect::<Vec<_>>())
            .finish()
    }
}
