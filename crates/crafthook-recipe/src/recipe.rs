//! Recipe entities and the serializers that back them.
//!
//! The reconciliation pipeline treats a [`Recipe`] as opaque: it only looks at
//! the identifier, the category and the serializer. Everything else lives in
//! the JSON payload and is interpreted by the serializer alone.

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use crafthook_common::{Identifier, RecipeCategory};
use serde_json::Value;
use tracing::debug;

use crate::error::{RecipeError, RecipeResult};

/// Whether a serializer can turn a recipe back into its document form.
pub enum Reserialization<'a> {
    /// Re-serialization is available through the given writer
    Supported(&'a dyn RecipeDocumentWriter),
    /// The serializer cannot produce documents
    Unsupported,
}

impl Reserialization<'_> {
    /// Returns true if re-serialization is available.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

/// Produces the structured document for a recipe.
pub trait RecipeDocumentWriter {
    /// Serializes one recipe to its document form.
    fn to_document(&self, recipe: &Recipe) -> RecipeResult<Value>;
}

/// A recipe serializer: decodes raw data for one recipe type.
pub trait RecipeSerializer: Send + Sync {
    /// Serializer identifier, matched against the `type` field of raw data.
    fn id(&self) -> &Identifier;

    /// Category recipes decoded by this serializer belong to.
    fn category(&self) -> &RecipeCategory;

    /// Validates raw data before it is wrapped into a [`Recipe`].
    fn check(&self, _id: &Identifier, _raw: &Value) -> RecipeResult<()> {
        Ok(())
    }

    /// Optional capability: turning recipes back into documents.
    fn reserialization(&self) -> Reserialization<'_> {
        Reserialization::Unsupported
    }
}

/// A single recipe.
#[derive(Clone)]
pub struct Recipe {
    id: Identifier,
    category: RecipeCategory,
    serializer: Arc<dyn RecipeSerializer>,
    payload: Value,
}

impl Recipe {
    /// Creates a recipe in its serializer's category.
    #[must_use]
    pub fn new(id: Identifier, serializer: Arc<dyn RecipeSerializer>, payload: Value) -> Self {
        Self {
            id,
            category: serializer.category().clone(),
            serializer,
            payload,
        }
    }

    /// Moves the recipe into another category.
    #[must_use]
    pub fn with_category(mut self, category: RecipeCategory) -> Self {
        self.category = category;
        self
    }

    /// Returns the recipe identifier.
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Returns the recipe category.
    #[must_use]
    pub fn category(&self) -> &RecipeCategory {
        &self.category
    }

    /// Returns the backing serializer.
    #[must_use]
    pub fn serializer(&self) -> &Arc<dyn RecipeSerializer> {
        &self.serializer
    }

    /// Returns the raw payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Serializes the recipe if its serializer supports it.
    ///
    /// Returns `None` when the capability is missing.
    pub fn to_document(&self) -> Option<RecipeResult<Value>> {
        match self.serializer.reserialization() {
            Reserialization::Supported(writer) => Some(writer.to_document(self)),
            Reserialization::Unsupported => None,
        }
    }
}

impl PartialEq for Recipe {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.category == other.category
            && self.serializer.id() == other.serializer.id()
            && self.payload == other.payload
    }
}

impl fmt::Debug for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("serializer", self.serializer.id())
            .field("payload", &self.payload)
            .finish()
    }
}

/// Table of known serializers, in registration order.
#[derive(Default)]
pub struct SerializerRegistry {
    serializers: Vec<Arc<dyn RecipeSerializer>>,
    by_id: AHashMap<Identifier, usize>,
}

impl SerializerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in serializers.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for serializer in crate::builtin::builtin_serializers() {
            // Builtin ids are distinct.
            let _ = registry.register(serializer);
        }
        registry
    }

    /// Registers a serializer, rejecting duplicate ids.
    pub fn register(&mut self, serializer: Arc<dyn RecipeSerializer>) -> RecipeResult<()> {
        let id = serializer.id().clone();
        if self.by_id.contains_key(&id) {
            return Err(RecipeError::DuplicateSerializer(id));
        }

        debug!("Registered recipe serializer {}", id);
        self.by_id.insert(id, self.serializers.len());
        self.serializers.push(serializer);
        Ok(())
    }

    /// Gets a serializer by id.
    #[must_use]
    pub fn get(&self, id: &Identifier) -> Option<&Arc<dyn RecipeSerializer>> {
        self.by_id.get(id).map(|&index| &self.serializers[index])
    }

    /// Returns the number of registered serializers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.serializers.len()
    }

    /// Returns true if no serializers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.serializers.is_empty()
    }

    /// Iterates serializers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RecipeSerializer>> {
        self.serializers.iter()
    }

    /// Ids of serializers lacking the re-serialization capability.
    pub fn without_reserialization(&self) -> impl Iterator<Item = &Identifier> {
        self.serializers
            .iter()
            .filter(|s| !s.reserialization().is_supported())
            .map(|s| s.id())
    }

    /// Decodes raw recipe data by dispatching on its `type` field.
    pub fn decode(&self, id: Identifier, raw: Value) -> RecipeResult<Recipe> {
        let type_name = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RecipeError::Malformed {
                id: id.clone(),
                reason: "missing string field \"type\"".to_string(),
            })?;
        let serializer_id: Identifier = type_name.parse()?;

        let serializer = self
            .get(&serializer_id)
            .ok_or(RecipeError::UnknownSerializer(serializer_id))?;
        serializer.check(&id, &raw)?;

        Ok(Recipe::new(id, Arc::clone(serializer), raw))
    }
}

impl fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.serializers.iter().map(|s| s.id()))
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Serializer without document support, for tests across the crate.
    pub(crate) struct OpaqueSerializer {
        id: Identifier,
        category: RecipeCategory,
    }

    impl OpaqueSerializer {
        pub(crate) fn new(id: &str, category: &str) -> Arc<Self> {
            Arc::new(Self {
                id: id.parse().expect("valid id"),
                category: category.parse().expect("valid category"),
            })
        }
    }

    impl RecipeSerializer for OpaqueSerializer {
        fn id(&self) -> &Identifier {
            &self.id
        }

        fn category(&self) -> &RecipeCategory {
            &self.category
        }
    }

    /// Builds an opaque recipe in the given category.
    pub(crate) fn opaque(id: &str, category: &str) -> Recipe {
        Recipe::new(
            id.parse().expect("valid id"),
            OpaqueSerializer::new("test:opaque", category),
            json!({ "type": "test:opaque" }),
        )
    }

    #[test]
    fn test_recipe_takes_serializer_category() {
        let recipe = opaque("mod:gear", "core:crafting");
        assert_eq!(recipe.category().to_string(), "core:crafting");

        let moved = recipe.with_category("core:smelting".parse().expect("valid"));
        assert_eq!(moved.category().to_string(), "core:smelting");
    }

    #[test]
    fn test_unsupported_recipe_has_no_document() {
        assert!(opaque("mod:gear", "core:crafting").to_document().is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_serializer() {
        let mut registry = SerializerRegistry::new();
        registry
            .register(OpaqueSerializer::new("test:a", "core:crafting"))
            .expect("first");
        let result = registry.register(OpaqueSerializer::new("test:a", "core:crafting"));
        assert!(matches!(result, Err(RecipeError::DuplicateSerializer(_))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_decode_dispatches_on_type() {
        let mut registry = SerializerRegistry::new();
        registry
            .register(OpaqueSerializer::new("test:opaque", "core:crafting"))
            .expect("register");

        let recipe = registry
            .decode("mod:gear".parse().expect("id"), json!({ "type": "test:opaque" }))
            .expect("decode");
        assert_eq!(recipe.id().to_string(), "mod:gear");
        assert_eq!(recipe.serializer().id().to_string(), "test:opaque");
    }

    #[test]
    fn test_decode_errors() {
        let registry = SerializerRegistry::new();
        let id: Identifier = "mod:gear".parse().expect("id");

        assert!(matches!(
            registry.decode(id.clone(), json!({})),
            Err(RecipeError::Malformed { .. })
        ));
        assert!(matches!(
            registry.decode(id.clone(), json!({ "type": "test:missing" })),
            Err(RecipeError::UnknownSerializer(_))
        ));
        assert!(matches!(
            registry.decode(id, json!({ "type": "Not Valid" })),
            Err(RecipeError::Identifier(_))
        ));
    }

    #[test]
    fn test_without_reserialization_lists_opaque_only() {
        let mut registry = SerializerRegistry::with_builtins();
        registry
            .register(OpaqueSerializer::new("test:opaque", "core:crafting"))
            .expect("register");

        let missing: Vec<String> = registry
            .without_reserialization()
            .map(ToString::to_string)
            .collect();
        assert_eq!(missing, ["test:opaque"]);
    }
}
