//! Recipe reload configuration.
//!
//! Flags come from a TOML file and from the environment. Environment flags
//! can only switch features on.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::dump::DEFAULT_DUMP_DIR;

/// Environment variable enabling debug mode.
pub const DEBUG_ENV: &str = "CRAFTHOOK_RECIPE_DEBUG";

/// Environment variable enabling the debug dump.
pub const DUMP_ENV: &str = "CRAFTHOOK_RECIPE_DUMP";

static PROCESS_CONFIG: OnceLock<RecipeConfig> = OnceLock::new();

/// Recipe reload configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Verbose per-recipe logging and compatibility warnings
    pub debug: bool,
    /// Write every dumpable recipe to disk after each reload
    pub dump: bool,
    /// Development build; also enables compatibility warnings
    pub development: bool,
    /// Root directory of the debug dump
    pub dump_dir: PathBuf,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            debug: false,
            dump: false,
            development: cfg!(debug_assertions),
            dump_dir: PathBuf::from(DEFAULT_DUMP_DIR),
        }
    }
}

impl RecipeConfig {
    /// Defaults with environment flags applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// The process-wide configuration, read from the environment once.
    pub fn process() -> &'static Self {
        PROCESS_CONFIG.get_or_init(Self::from_env)
    }

    /// Switches on any flag set in the environment.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.debug |= env_flag(DEBUG_ENV);
        self.dump |= env_flag(DUMP_ENV);
        self
    }

    /// Whether serializer compatibility warnings are logged.
    #[must_use]
    pub const fn warnings_enabled(&self) -> bool {
        self.debug || self.development
    }

    /// Load configuration from a TOML file.
    /// Returns defaults if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Recipe config not found at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    info!("Loaded recipe config from {}", path.display());
                    config
                },
                Err(e) => {
                    warn!("Failed to parse recipe config: {e}");
                    Self::default()
                },
            },
            Err(e) => {
                warn!("Failed to read recipe config: {e}");
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

        info!("Saved recipe config to {}", path.display());
        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|value| parse_flag(&value))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
