//! Built-in serializers for the core recipe types.
//!
//! Each of these can write its recipes back out as documents, which is what
//! the debug dump relies on.

use std::sync::Arc;

use crafthook_common::{Identifier, RecipeCategory};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{RecipeError, RecipeResult};
use crate::recipe::{Recipe, RecipeDocumentWriter, RecipeSerializer, Reserialization};

/// A recipe input: one item or any item of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ingredient {
    /// A single item
    Item {
        /// Item identifier
        item: Identifier,
    },
    /// Any item in a tag
    Tag {
        /// Tag identifier
        tag: Identifier,
    },
}

/// An output item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Item identifier
    pub item: Identifier,
}

/// Single-input cutting recipe body (stonecutter style).
#[derive(Debug, Clone, Deserialize)]
pub struct CuttingBody {
    /// Recipe book group
    #[serde(default)]
    pub group: String,
    /// The input
    pub ingredient: Ingredient,
    /// Output item
    pub result: Identifier,
    /// Output count
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

/// Smithing recipe that transforms a base item into a new item.
#[derive(Debug, Clone, Deserialize)]
pub struct SmithingTransformBody {
    /// Template slot
    pub template: Ingredient,
    /// Base slot
    pub base: Ingredient,
    /// Addition slot
    pub addition: Ingredient,
    /// Output item
    pub result: ResultItem,
}

/// Smithing recipe that applies a trim to the base item.
#[derive(Debug, Clone, Deserialize)]
pub struct SmithingTrimBody {
    /// Template slot
    pub template: Ingredient,
    /// Base slot
    pub base: Ingredient,
    /// Addition slot
    pub addition: Ingredient,
}

fn category(path: &str) -> RecipeCategory {
    RecipeCategory::new(Identifier::core(path))
}

fn parse_body<T: DeserializeOwned>(id: &Identifier, raw: &Value) -> RecipeResult<T> {
    T::deserialize(raw).map_err(|e| RecipeError::Malformed {
        id: id.clone(),
        reason: e.to_string(),
    })
}

fn to_value<T: Serialize>(id: &Identifier, value: &T) -> RecipeResult<Value> {
    serde_json::to_value(value).map_err(|source| RecipeError::Serialize {
        id: id.clone(),
        source,
    })
}

/// Serializer for single-input cutting recipes.
pub struct CuttingSerializer {
    id: Identifier,
    category: RecipeCategory,
}

impl CuttingSerializer {
    /// The `core:stonecutting` serializer.
    #[must_use]
    pub fn stonecutting() -> Self {
        Self {
            id: Identifier::core("stonecutting"),
            category: category("stonecutting"),
        }
    }
}

impl RecipeSerializer for CuttingSerializer {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn category(&self) -> &RecipeCategory {
        &self.category
    }

    fn check(&self, id: &Identifier, raw: &Value) -> RecipeResult<()> {
        let body: CuttingBody = parse_body(id, raw)?;
        if body.count == 0 {
            return Err(RecipeError::Malformed {
                id: id.clone(),
                reason: "count must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn reserialization(&self) -> Reserialization<'_> {
        Reserialization::Supported(self)
    }
}

impl RecipeDocumentWriter for CuttingSerializer {
    fn to_document(&self, recipe: &Recipe) -> RecipeResult<Value> {
        let body: CuttingBody = parse_body(recipe.id(), recipe.payload())?;

        let mut doc = Map::new();
        doc.insert("type".into(), Value::String(self.id.to_string()));
        if !body.group.is_empty() {
            doc.insert("group".into(), Value::String(body.group));
        }
        doc.insert("ingredient".into(), to_value(recipe.id(), &body.ingredient)?);
        doc.insert("result".into(), Value::String(body.result.to_string()));
        doc.insert("count".into(), Value::from(body.count));
        Ok(Value::Object(doc))
    }
}

/// Serializer for smithing transform recipes.
pub struct SmithingTransformSerializer {
    id: Identifier,
    category: RecipeCategory,
}

impl Default for SmithingTransformSerializer {
    fn default() -> Self {
        Self {
            id: Identifier::core("smithing_transform"),
            category: category("smithing"),
        }
    }
}

impl RecipeSerializer for SmithingTransformSerializer {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn category(&self) -> &RecipeCategory {
        &self.category
    }

    fn check(&self, id: &Identifier, raw: &Value) -> RecipeResult<()> {
        parse_body::<SmithingTransformBody>(id, raw).map(|_| ())
    }

    fn reserialization(&self) -> Reserialization<'_> {
        Reserialization::Supported(self)
    }
}

impl RecipeDocumentWriter for SmithingTransformSerializer {
    fn to_document(&self, recipe: &Recipe) -> RecipeResult<Value> {
        let id = recipe.id();
        let body: SmithingTransformBody = parse_body(id, recipe.payload())?;
        Ok(json!({
            "type": self.id.to_string(),
            "template": to_value(id, &body.template)?,
            "base": to_value(id, &body.base)?,
            "addition": to_value(id, &body.addition)?,
            "result": to_value(id, &body.result)?,
        }))
    }
}

/// Serializer for smithing trim recipes.
pub struct SmithingTrimSerializer {
    id: Identifier,
    category: RecipeCategory,
}

impl Default for SmithingTrimSerializer {
    fn default() -> Self {
        Self {
            id: Identifier::core("smithing_trim"),
            category: category("smithing"),
        }
    }
}

impl RecipeSerializer for SmithingTrimSerializer {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn category(&self) -> &RecipeCategory {
        &self.category
    }

    fn check(&self, id: &Identifier, raw: &Value) -> RecipeResult<()> {
        parse_body::<SmithingTrimBody>(id, raw).map(|_| ())
    }

    fn reserialization(&self) -> Reserialization<'_> {
        Reserialization::Supported(self)
    }
}

impl RecipeDocumentWriter for SmithingTrimSerializer {
    fn to_document(&self, recipe: &Recipe) -> RecipeResult<Value> {
        let id = recipe.id();
        let body: SmithingTrimBody = parse_body(id, recipe.payload())?;
        Ok(json!({
            "type": self.id.to_string(),
            "template": to_value(id, &body.template)?,
            "base": to_value(id, &body.base)?,
            "addition": to_value(id, &body.addition)?,
        }))
    }
}

/// Serializer for hard-coded recipes whose only data is their type.
pub struct SpecialSerializer {
    id: Identifier,
    category: RecipeCategory,
}

impl SpecialSerializer {
    /// Creates a special serializer `core:<path>` in the crafting category.
    #[must_use]
    pub fn crafting(path: &str) -> Self {
        Self {
            id: Identifier::core(path),
            category: category("crafting"),
        }
    }
}

impl RecipeSerializer for SpecialSerializer {
    fn id(&self) -> &Identifier {
        &self.id
    }

    fn category(&self) -> &RecipeCategory {
        &self.category
    }

    fn reserialization(&self) -> Reserialization<'_> {
        Reserialization::Supported(self)
    }
}

impl RecipeDocumentWriter for SpecialSerializer {
    fn to_document(&self, _recipe: &Recipe) -> RecipeResult<Value> {
        Ok(json!({ "type": self.id.to_string() }))
    }
}

/// All built-in serializers, in registration order.
#[must_use]
pub fn builtin_serializers() -> Vec<Arc<dyn RecipeSerializer>> {
    vec![
        Arc::new(CuttingSerializer::stonecutting()),
        Arc::new(SmithingTransformSerializer::default()),
        Arc::new(SmithingTrimSerializer::default()),
        Arc::new(SpecialSerializer::crafting("crafting_special_armordye")),
        Arc::new(SpecialSerializer::crafting("crafting_special_repairitem")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::SerializerRegistry;

    fn decode(id: &str, raw: Value) -> RecipeResult<Recipe> {
        SerializerRegistry::with_builtins().decode(id.parse().expect("id"), raw)
    }

    #[test]
    fn test_cutting_document() {
        let recipe = decode(
            "core:stone_slab",
            json!({
                "type": "core:stonecutting",
                "ingredient": { "item": "core:stone" },
                "result": "core:stone_slab",
                "count": 2,
            }),
        )
        .expect("decode");
        assert_eq!(recipe.category().to_string(), "core:stonecutting");

        let doc = recipe.to_document().expect("supported").expect("serialize");
        assert_eq!(
            doc,
            json!({
                "type": "core:stonecutting",
                "ingredient": { "item": "core:stone" },
                "result": "core:stone_slab",
                "count": 2,
            })
        );
    }

    #[test]
    fn test_cutting_keeps_group_and_defaults_count() {
        let recipe = decode(
            "core:stone_bricks",
            json!({
                "type": "core:stonecutting",
                "group": "bricks",
                "ingredient": { "tag": "core:stones" },
                "result": "core:stone_bricks",
            }),
        )
        .expect("decode");

        let doc = recipe.to_document().expect("supported").expect("serialize");
        assert_eq!(doc["group"], "bricks");
        assert_eq!(doc["ingredient"], json!({ "tag": "core:stones" }));
        assert_eq!(doc["count"], 1);
    }

    #[test]
    fn test_cutting_rejects_zero_count() {
        let result = decode(
            "core:nothing",
            json!({
                "type": "core:stonecutting",
                "ingredient": { "item": "core:stone" },
                "result": "core:stone",
                "count": 0,
            }),
        );
        assert!(matches!(result, Err(RecipeError::Malformed { .. })));
    }

    #[test]
    fn test_smithing_transform_document() {
        let raw = json!({
            "type": "core:smithing_transform",
            "template": { "item": "core:upgrade_template" },
            "base": { "item": "core:diamond_sword" },
            "addition": { "item": "core:netherite_ingot" },
            "result": { "item": "core:netherite_sword" },
        });
        let recipe = decode("core:netherite_sword", raw.clone()).expect("decode");
        assert_eq!(recipe.category().to_string(), "core:smithing");

        let doc = recipe.to_document().expect("supported").expect("serialize");
        assert_eq!(doc, raw);
    }

    #[test]
    fn test_smithing_trim_requires_all_slots() {
        let result = decode(
            "core:coast_trim",
            json!({
                "type": "core:smithing_trim",
                "template": { "item": "core:coast_template" },
                "base": { "tag": "core:trimmable_armor" },
            }),
        );
        assert!(matches!(result, Err(RecipeError::Malformed { .. })));
    }

    #[test]
    fn test_special_document_is_type_only() {
        let recipe = decode(
            "core:repair_item",
            json!({ "type": "core:crafting_special_repairitem", "extra": true }),
        )
        .expect("decode");

        let doc = recipe.to_document().expect("supported").expect("serialize");
        assert_eq!(doc, json!({ "type": "core:crafting_special_repairitem" }));
    }
}
