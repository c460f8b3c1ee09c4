//! The reconciled recipe set: a global index plus a per-category partition.

use std::collections::BTreeMap;
use std::sync::Arc;

use crafthook_common::{Identifier, RecipeCategory};

use crate::error::{RecipeError, RecipeResult};
use crate::recipe::Recipe;

type Bucket = BTreeMap<Identifier, Arc<Recipe>>;

/// Recipes indexed by identifier and by category.
///
/// Every entry of the global map appears in exactly one category bucket (the
/// one matching its recipe's category) and every bucket entry appears in the
/// global map. Both views share the same `Arc` per recipe. Only the phase
/// handlers can mutate a set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeSet {
    global: Bucket,
    by_category: BTreeMap<RecipeCategory, Bucket>,
}

impl RecipeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.global.len()
    }

    /// Returns true if the set holds no recipes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }

    /// Gets a recipe by identifier.
    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<&Arc<Recipe>> {
        self.global.get(id)
    }

    /// Returns true if a recipe with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.global.contains_key(id)
    }

    /// Iterates all recipes in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.global.values()
    }

    /// Iterates all identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.global.keys()
    }

    /// Iterates the non-empty categories in order.
    pub fn categories(&self) -> impl Iterator<Item = &RecipeCategory> {
        self.by_category.keys()
    }

    /// Iterates the recipes of one category.
    pub fn category(&self, category: &RecipeCategory) -> impl Iterator<Item = &Arc<Recipe>> {
        self.by_category
            .get(category)
            .into_iter()
            .flat_map(BTreeMap::values)
    }

    /// Gets a recipe of one category by identifier.
    #[must_use]
    pub fn get_in(&self, category: &RecipeCategory, id: &Identifier) -> Option<&Arc<Recipe>> {
        self.by_category.get(category).and_then(|bucket| bucket.get(id))
    }

    /// Inserts a recipe whose identifier is not yet present.
    ///
    /// Hands the recipe back if the identifier is taken.
    pub(crate) fn insert_new(&mut self, recipe: Arc<Recipe>) -> Result<(), Arc<Recipe>> {
        if self.global.contains_key(recipe.id()) {
            return Err(recipe);
        }

        self.by_category
            .entry(recipe.category().clone())
            .or_default()
            .insert(recipe.id().clone(), Arc::clone(&recipe));
        self.global.insert(recipe.id().clone(), recipe);
        Ok(())
    }

    /// Replaces an existing recipe, moving it between buckets if its category
    /// changed. Returns the old recipe, or `None` (and does nothing) if the
    /// identifier is absent.
    pub(crate) fn replace(&mut self, recipe: Arc<Recipe>) -> Option<Arc<Recipe>> {
        let old = self.global.get(recipe.id())?.clone();

        if old.category() != recipe.category() {
            self.detach(old.category(), old.id());
        }
        self.by_category
            .entry(recipe.category().clone())
            .or_default()
            .insert(recipe.id().clone(), Arc::clone(&recipe));
        self.global.insert(recipe.id().clone(), recipe);
        Some(old)
    }

    /// Removes a recipe from both views.
    pub(crate) fn remove(&mut self, id: &Identifier) -> Option<Arc<Recipe>> {
        let old = self.global.remove(id)?;
        self.detach(old.category(), id);
        Some(old)
    }

    fn detach(&mut self, category: &RecipeCategory, id: &Identifier) {
        if let Some(bucket) = self.by_category.get_mut(category) {
            bucket.remove(id);
            if bucket.is_empty() {
                self.by_category.remove(category);
            }
        }
    }

    /// Verifies that the global map and the category buckets agree.
    pub fn check_consistency(&self) -> RecipeResult<()> {
        let mut bucketed = 0;

        for (category, bucket) in &self.by_category {
            if bucket.is_empty() {
                return Err(RecipeError::Inconsistent(format!(
                    "empty bucket for category {category}"
                )));
            }
            for (id, recipe) in bucket {
                if recipe.id() != id {
                    return Err(RecipeError::Inconsistent(format!(
                        "bucket key {id} holds recipe {}",
                        recipe.id()
                    )));
                }
                if recipe.category() != category {
                    return Err(RecipeError::Inconsistent(format!(
                        "recipe {id} of category {} filed under {category}",
                        recipe.category()
                    )));
                }
                match self.global.get(id) {
                    Some(global) if Arc::ptr_eq(global, recipe) => {},
                    Some(_) => {
                        return Err(RecipeError::Inconsistent(format!(
                            "recipe {id} differs between global and category views"
                        )))
                    },
                    None => {
                        return Err(RecipeError::Inconsistent(format!(
                            "recipe {id} in category {category} missing from global map"
                        )))
                    },
                }
                bucketed += 1;
            }
        }

        // Each bucket entry matched a distinct global key; equal counts mean
        // nothing in the global map is unbucketed.
        if bucketed != self.global.len() {
            return Err(RecipeError::Inconsistent(format!(
                "{} recipes in global map but {bucketed} in category buckets",
                self.global.len()
            )));
        }

        Ok(())
    }
}
