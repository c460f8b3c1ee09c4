//! Handles passed to listeners in each reload phase.

mod modify;
mod register;
mod remove;

pub use modify::ModifyRecipeHandler;
pub use register::{LoadOutcome, RegisterRecipeHandler};
pub use remove::RemoveRecipeHandler;
