//! Recipe data loading.
//!
//! Reads datapack-style recipe files from `<root>/<namespace>/recipes/**`.
//! A file's identifier is its namespace directory plus its path below
//! `recipes/` without the extension. JSON and TOML files are accepted.
//! Broken files are logged and counted; they never stop the load.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crafthook_common::{Identifier, IdentifierError};
use crafthook_recipe::context::RegistryContext;
use crafthook_recipe::error::RecipeError;
use crafthook_recipe::recipe::{Recipe, SerializerRegistry};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Directory below each namespace holding recipe files.
pub const RECIPES_DIR: &str = "recipes";

/// Errors that can occur while loading recipe data.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read a file or directory.
    #[error("Failed to read {path:?}: {source}")]
    Read {
        /// Path being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse JSON.
    #[error("Failed to parse JSON in {path:?}: {source}")]
    Json {
        /// File being parsed
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse TOML.
    #[error("Failed to parse TOML in {path:?}: {source}")]
    Toml {
        /// File being parsed
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// File location does not form a valid identifier.
    #[error("Invalid recipe location {path:?}: {source}")]
    Location {
        /// Offending file
        path: PathBuf,
        /// Identifier error
        #[source]
        source: IdentifierError,
    },

    /// Two files map to the same identifier.
    #[error("Recipe {id} defined twice, ignoring {path:?}")]
    Duplicate {
        /// Shared identifier
        id: Identifier,
        /// The file that lost
        path: PathBuf,
    },

    /// The serializer rejected the data.
    #[error(transparent)]
    Recipe(#[from] RecipeError),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Statistics for the recipe file loader.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoaderStats {
    /// Number of namespaces scanned.
    pub namespaces: usize,
    /// Number of recipes loaded.
    pub recipes_loaded: usize,
    /// Number of files that failed to load.
    pub errors: usize,
}

/// Loads recipe files below a data root.
#[derive(Debug)]
pub struct RecipeFileLoader {
    root: PathBuf,
    stats: LoaderStats,
}

impl RecipeFileLoader {
    /// Creates a loader for `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        debug!("Initializing recipe file loader at: {:?}", root);
        Self {
            root,
            stats: LoaderStats::default(),
        }
    }

    /// Returns loader statistics.
    #[must_use]
    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    /// Loads every recipe below the root.
    ///
    /// A missing root yields an empty map. Only an unreadable root is an
    /// error; everything below it is logged and counted.
    pub fn load_all(
        &mut self,
        serializers: &SerializerRegistry,
    ) -> LoadResult<BTreeMap<Identifier, Recipe>> {
        self.stats = LoaderStats::default();
        let mut recipes = BTreeMap::new();

        if !self.root.exists() {
            info!("Recipe data directory {:?} does not exist, nothing to load", self.root);
            return Ok(recipes);
        }

        for namespace_dir in sorted_entries(&self.root)? {
            if !namespace_dir.is_dir() {
                continue;
            }
            let Some(namespace) = namespace_dir.file_name().and_then(|n| n.to_str()) else {
                warn!("Skipping non UTF-8 namespace directory {:?}", namespace_dir);
                continue;
            };
            let recipes_dir = namespace_dir.join(RECIPES_DIR);
            if !recipes_dir.is_dir() {
                continue;
            }

            self.stats.namespaces += 1;
            let mut files = Vec::new();
            if let Err(e) = collect_files(&recipes_dir, &mut files) {
                warn!("Failed to scan {:?}: {}", recipes_dir, e);
                self.stats.errors += 1;
            }

            for path in files {
                match self.load_file(serializers, namespace, &recipes_dir, &path, &recipes) {
                    Ok(recipe) => {
                        recipes.insert(recipe.id().clone(), recipe);
                    },
                    Err(e) => {
                        warn!("Failed to load recipe file {:?}: {}", path, e);
                        self.stats.errors += 1;
                    },
                }
            }
        }

        self.stats.recipes_loaded = recipes.len();
        info!(
            "Loaded {} recipes from {} namespaces ({} errors)",
            self.stats.recipes_loaded, self.stats.namespaces, self.stats.errors
        );
        Ok(recipes)
    }

    fn load_file(
        &self,
        serializers: &SerializerRegistry,
        namespace: &str,
        recipes_dir: &Path,
        path: &Path,
        loaded: &BTreeMap<Identifier, Recipe>,
    ) -> LoadResult<Recipe> {
        let id = identifier_for(namespace, recipes_dir, path)?;
        if loaded.contains_key(&id) {
            return Err(LoadError::Duplicate {
                id,
                path: path.to_path_buf(),
            });
        }

        debug!("Loading recipe {} from {:?}", id, path);
        let raw = read_document(path)?;
        Ok(serializers.decode(id, raw)?)
    }
}

/// Reads one JSON or TOML document.
pub fn read_document(path: &Path) -> LoadResult<Value> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content).map_err(|source| LoadError::Toml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Loads a registry context snapshot from a TOML file.
pub fn load_registry_context(path: &Path) -> LoadResult<RegistryContext> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let context: RegistryContext = toml::from_str(&content).map_err(|source| LoadError::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        "Loaded registry context with {} registries from {:?}",
        context.registries().count(),
        path
    );
    Ok(context)
}

fn identifier_for(namespace: &str, recipes_dir: &Path, path: &Path) -> LoadResult<Identifier> {
    let location = |source| LoadError::Location {
        path: path.to_path_buf(),
        source,
    };

    let relative = path.strip_prefix(recipes_dir).unwrap_or(path).with_extension("");
    let segments: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str().unwrap_or("\u{fffd}"))
        .collect();

    Identifier::new(namespace, segments.join("/")).map_err(location)
}

fn is_recipe_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "json" | "toml"))
}

/// Directory entries in name order, so loads are deterministic.
fn sorted_entries(dir: &Path) -> LoadResult<Vec<PathBuf>> {
    let read = |source| LoadError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(read)?;
    entries.sort();
    Ok(entries)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> LoadResult<()> {
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            collect_files(&path, files)?;
        } else if is_recipe_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}
