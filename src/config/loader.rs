//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/funcsum/config.toml)
//! 3. Project config (./funcsum.toml)
//! 4. Environment variables (FUNCSUM_* prefix, `__` between nested keys)
//! 5. Explicit `--config` file

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::constants::files;
use crate::types::{FuncsumError, Result};

/// Environment variable prefix
const ENV_PREFIX: &str = "FUNCSUM_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars → explicit file
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        Self::load_layers(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
            explicit,
        )
    }

    /// Merge the given layers; missing global or project files are skipped,
    /// a missing explicit file is an error.
    pub fn load_layers(
        global: Option<&Path>,
        project: &Path,
        explicit: Option<&Path>,
    ) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // e.g. FUNCSUM_CHUNKING__MAX_LINES -> chunking.max_lines
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(FuncsumError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        let config: Config = figment
            .extract()
            .map_err(|e| FuncsumError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/funcsum/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("funcsum"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(files::PROJECT_CONFIG)
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Describe the config file locations, marking which exist
    pub fn describe_paths() -> Vec<(&'static str, Option<PathBuf>, bool)> {
        let global = Self::global_config_path();
        let global_exists = global.as_ref().is_some_and(|p| p.exists());
        let project = Self::project_config_path();
        let project_exists = project.exists();

        vec![
            ("Global", global, global_exists),
            ("Project", Some(project), project_exists),
        ]
    }

    /// Render the effective configuration as TOML or pretty JSON
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            Ok(toml::to_string_pretty(config)?)
        }
    }
}
