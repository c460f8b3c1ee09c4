//! # Crafthook
//!
//! Host binary for the recipe extension layer.
//!
//! Loads the recipe data directory, registers static recipes, stages the
//! registry context and runs one reload cycle:
//! - Config: `crafthook.toml`, or the path given as the first argument;
//!   `crafthook --init [path]` writes the defaults
//! - Data: `<data_dir>/<namespace>/recipes/**/*.{json,toml}`
//! - Listeners: disabled recipes and category overrides from the config

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod listeners;
mod loader;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use crafthook_recipe::context::RegistryContext;
use crafthook_recipe::manager::{RecipeManager, ReloadReport};
use crafthook_recipe::recipe::SerializerRegistry;
use crafthook_recipe::statics::register_static_recipe;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{HostConfig, CONFIG_FILE};
use crate::loader::{load_registry_context, RecipeFileLoader};

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("crafthook=info".parse()?))
        .init();

    info!("Crafthook starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args_os().skip(1);
    let first = args.next();
    if first.as_deref().is_some_and(|arg| arg == "--init") {
        let path = args.next().map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
        HostConfig::default()
            .save_to(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        return Ok(());
    }

    let config_path = first.map_or_else(|| PathBuf::from(CONFIG_FILE), PathBuf::from);
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let config = HostConfig::load_from(&config_path)
        .with_env_overrides()
        .relative_to(&base_dir);

    let report = run(&config)?;
    info!(
        "Reload complete: {} recipes in {} categories ({} added, {} from data, {} rejected, {} modified, {} removed)",
        report.set.len(),
        report.set.categories().count(),
        report.added,
        report.base_loaded,
        report.rejected,
        report.modified,
        report.removed
    );
    if let Some(dump) = report.dump {
        info!(
            "Dump: {} written, {} skipped, {} failed",
            dump.written, dump.skipped, dump.failed
        );
    }

    info!("Crafthook shutdown complete");
    Ok(())
}

/// Runs one reload cycle as configured.
fn run(config: &HostConfig) -> Result<ReloadReport> {
    let serializers = Arc::new(SerializerRegistry::with_builtins());

    if let Some(static_dir) = &config.static_dir {
        let statics = RecipeFileLoader::new(static_dir)
            .load_all(&serializers)
            .context("Failed to load static recipes")?;
        for recipe in statics.into_values() {
            register_static_recipe(recipe)?;
        }
    }

    let context = match &config.registries_file {
        Some(path) => load_registry_context(path)?,
        None => RegistryContext::new(),
    };

    let manager = RecipeManager::builder()
        .config(config.recipe.clone())
        .serializers(Arc::clone(&serializers))
        .listeners(|events| listeners::install(events, config))
        .build();

    // Registry setup precedes the data reload, as in the engine's own order.
    manager.on_registry_setup(context);

    let mut loader = RecipeFileLoader::new(&config.data_dir);
    let base = loader
        .load_all(manager.serializers())
        .context("Failed to load recipe data")?;
    if loader.stats().errors > 0 {
        warn!(
            "{} recipe files under {:?} failed to load",
            loader.stats().errors,
            config.data_dir
        );
    }

    Ok(manager.reload_staged(base)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, contents).expect("write");
    }

    #[test]
    fn test_run_from_config_file() {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path();

        write(
            root,
            "data/core/recipes/stone_slab.json",
            r#"{
                "type": "core:stonecutting",
                "ingredient": { "item": "core:stone" },
                "result": "core:stone_slab",
                "count": 2
            }"#,
        );
        write(
            root,
            "data/core/recipes/dye.json",
            r#"{ "type": "core:crafting_special_armordye" }"#,
        );
        write(
            root,
            "static/hostmod/recipes/repair.toml",
            "type = \"core:crafting_special_repairitem\"\n",
        );
        write(
            root,
            "registries.toml",
            "[registries]\n\"core:item\" = [\"core:stone\"]\n",
        );
        write(
            root,
            CONFIG_FILE,
            r#"
static_dir = "static"
registries_file = "registries.toml"
disabled_recipes = ["core:dye"]

[recipe]
dump = true
development = false
"#,
        );

        let config_path = root.join(CONFIG_FILE);
        let config = HostConfig::load_from(&config_path).relative_to(root);
        let report = run(&config).expect("run");

        let ids: Vec<String> = report.set.ids().map(ToString::to_string).collect();
        assert_eq!(ids, ["core:stone_slab", "hostmod:repair"]);
        assert_eq!(report.added, 1);
        assert_eq!(report.base_loaded, 2);
        assert_eq!(report.removed, 1);

        let dump = report.dump.expect("dump enabled");
        assert_eq!(dump.written, 2);
        assert!(root
            .join("debug/crafthook/recipe/core/recipes/stone_slab.json")
            .exists());
    }
}
