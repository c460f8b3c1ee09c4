//! Host configuration.
//!
//! Points the host at its data directories and carries the recipe flags plus
//! the configuration-driven edits applied during the modify and remove
//! phases. Loaded from and saved to a TOML file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crafthook_common::{Identifier, RecipeCategory};
use crafthook_recipe::config::RecipeConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "crafthook.toml";

/// Default base data directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Host configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Base recipe data, laid out as `<namespace>/recipes/**`
    pub data_dir: PathBuf,
    /// Recipes registered as static before the first reload
    pub static_dir: Option<PathBuf>,
    /// TOML snapshot of dynamic registries (None = empty context)
    pub registries_file: Option<PathBuf>,
    /// Recipes deleted during the remove phase
    pub disabled_recipes: Vec<Identifier>,
    /// Recipes moved to another category during the modify phase
    pub category_overrides: BTreeMap<Identifier, RecipeCategory>,
    /// Reload flags
    pub recipe: RecipeConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_dir: None,
            registries_file: None,
            disabled_recipes: Vec::new(),
            category_overrides: BTreeMap::new(),
            recipe: RecipeConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load configuration from a TOML file.
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                },
                Err(e) => {
                    warn!("Failed to parse config file: {e}");
                    Self::default()
                },
            },
            Err(e) => {
                warn!("Failed to read config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a TOML file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Switches on recipe flags set in the environment.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.recipe = self.recipe.with_env_overrides();
        self
    }

    /// Resolves relative directories against `base`.
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };

        self.data_dir = resolve(self.data_dir);
        self.static_dir = self.static_dir.map(resolve);
        self.registries_file = self.registries_file.map(resolve);
        self.recipe.dump_dir = resolve(self.recipe.dump_dir);
        self
    }
}
