//! Debug dump of reconciled recipes.
//!
//! Writes every recipe whose serializer can re-serialize it to
//! `<root>/<namespace>/recipes/<path>.json`. The dump is a diagnostic aid:
//! failures are logged per recipe and never abort a reload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crafthook_common::Identifier;
use thiserror::Error;
use tracing::{error, info};

use crate::error::RecipeError;
use crate::recipe::{Recipe, Reserialization};
use crate::set::RecipeSet;

/// Default dump root.
pub const DEFAULT_DUMP_DIR: &str = "debug/crafthook/recipe";

/// File extension of dumped recipes.
pub const DUMP_EXTENSION: &str = "json";

/// Failure dumping one recipe.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Could not create a directory
    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        /// Directory being created
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Could not write the file
    #[error("Failed to write {path:?}: {source}")]
    Write {
        /// File being written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Could not produce the document
    #[error(transparent)]
    Serialize(#[from] RecipeError),
}

/// Counts from one dump run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpSummary {
    /// Files written
    pub written: usize,
    /// Recipes without re-serialization support
    pub skipped: usize,
    /// Recipes that failed to dump
    pub failed: usize,
}

/// Writes recipe documents under a root directory.
#[derive(Debug, Clone)]
pub struct RecipeDumper {
    root: PathBuf,
}

impl Default for RecipeDumper {
    fn default() -> Self {
        Self::new(DEFAULT_DUMP_DIR)
    }
}

impl RecipeDumper {
    /// Creates a dumper writing under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the dump root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output path for a recipe identifier.
    #[must_use]
    pub fn path_for(&self, id: &Identifier) -> PathBuf {
        self.root
            .join(id.namespace())
            .join("recipes")
            .join(format!("{}.{DUMP_EXTENSION}", id.path()))
    }

    /// Dumps every supported recipe of the set.
    pub fn dump(&self, set: &RecipeSet) -> DumpSummary {
        let mut summary = DumpSummary::default();

        if let Err(e) = fs::create_dir_all(&self.root) {
            error!(
                "Failed to create debug directory {:?} for recipe dumping: {}",
                self.root, e
            );
            summary.failed = set.len();
            return summary;
        }

        for recipe in set.iter() {
            match self.dump_one(recipe) {
                Ok(true) => summary.written += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    error!("Cannot dump recipe {}: {}", recipe.id(), e);
                    summary.failed += 1;
                },
            }
        }

        info!(
            "Dumped {} recipes to {:?} ({} skipped, {} failed)",
            summary.written, self.root, summary.skipped, summary.failed
        );
        summary
    }

    /// Dumps on a background thread over an immutable snapshot.
    pub fn spawn(self, set: Arc<RecipeSet>) -> io::Result<JoinHandle<DumpSummary>> {
        thread::Builder::new()
            .name("recipe-dump".into())
            .spawn(move || self.dump(&set))
    }

    /// Writes one recipe. Returns false if its serializer cannot write it.
    fn dump_one(&self, recipe: &Recipe) -> Result<bool, DumpError> {
        let writer = match recipe.serializer().reserialization() {
            Reserialization::Supported(writer) => writer,
            Reserialization::Unsupported => return Ok(false),
        };

        let document = writer.to_document(recipe)?;
        let path = self.path_for(recipe.id());

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| DumpError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let text = serde_json::to_string_pretty(&document).map_err(|source| {
            RecipeError::Serialize {
                id: recipe.id().clone(),
                source,
            }
        })?;
        fs::write(&path, text).map_err(|source| DumpError::Write { path, source })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::tests::opaque;
    use crate::recipe::SerializerRegistry;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_set() -> RecipeSet {
        let serializers = SerializerRegistry::with_builtins();
        let mut set = RecipeSet::new();
        let cutting = serializers
            .decode(
                "core:stone_slab".parse().expect("id"),
                json!({
                    "type": "core:stonecutting",
                    "ingredient": { "item": "core:stone" },
                    "result": "core:stone_slab",
                    "count": 2,
                }),
            )
            .expect("decode");
        let special = serializers
            .decode(
                "mymod:tools/repair".parse().expect("id"),
                json!({ "type": "core:crafting_special_repairitem" }),
            )
            .expect("decode");

        set.insert_new(Arc::new(cutting)).expect("insert");
        set.insert_new(Arc::new(special)).expect("insert");
        set.insert_new(Arc::new(opaque("mymod:gear", "core:crafting")))
            .expect("insert");
        set
    }

    #[test]
    fn test_path_layout() {
        let dumper = RecipeDumper::new("debug/crafthook/recipe");
        let path = dumper.path_for(&"mymod:tools/iron_pick".parse().expect("id"));
        assert_eq!(
            path,
            PathBuf::from("debug/crafthook/recipe/mymod/recipes/tools/iron_pick.json")
        );
    }

    #[test]
    fn test_dump_writes_supported_and_skips_others() {
        let temp_dir = TempDir::new().expect("temp dir");
        let dumper = RecipeDumper::new(temp_dir.path().join("dump"));

        let summary = dumper.dump(&sample_set());
        assert_eq!(
            summary,
            DumpSummary {
                written: 2,
                skipped: 1,
                failed: 0
            }
        );

        let slab = fs::read_to_string(dumper.path_for(&"core:stone_slab".parse().expect("id")))
            .expect("slab dumped");
        assert!(slab.contains("\n  \"count\": 2"), "2-space indent: {slab}");
        let parsed: serde_json::Value = serde_json::from_str(&slab).expect("valid json");
        assert_eq!(parsed["count"], 2);

        assert!(dumper
            .path_for(&"mymod:tools/repair".parse().expect("id"))
            .exists());
        assert!(!dumper.path_for(&"mymod:gear".parse().expect("id")).exists());
    }

    #[test]
    fn test_dump_overwrites_existing_file() {
        let temp_dir = TempDir::new().expect("temp dir");
        let dumper = RecipeDumper::new(temp_dir.path());
        let path = dumper.path_for(&"core:stone_slab".parse().expect("id"));
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "stale contents that are much longer than the new document ".repeat(10))
            .expect("write");

        dumper.dump(&sample_set());

        let text = fs::read_to_string(&path).expect("read");
        assert!(!text.contains("stale"));
        serde_json::from_str::<serde_json::Value>(&text).expect("valid json");
    }

    #[test]
    fn test_failure_in_one_namespace_does_not_stop_others() {
        let temp_dir = TempDir::new().expect("temp dir");
        let dumper = RecipeDumper::new(temp_dir.path());

        // A file where the `mymod` namespace directory should go.
        fs::write(temp_dir.path().join("mymod"), "not a directory").expect("write");

        let summary = dumper.dump(&sample_set());
        assert_eq!(summary.written, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(dumper
            .path_for(&"core:stone_slab".parse().expect("id"))
            .exists());
    }

    #[test]
    fn test_spawned_dump_matches_inline() {
        let temp_dir = TempDir::new().expect("temp dir");
        let dumper = RecipeDumper::new(temp_dir.path());

        let handle = dumper.spawn(Arc::new(sample_set())).expect("spawn");
        let summary = handle.join().expect("dump thread");
        assert_eq!(summary.written, 2);
    }
}
