//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/funcsum/config.toml)
//! 3. Project config (./funcsum.toml)
//! 4. Environment variables (FUNCSUM_*)
//! 5. Explicit `--config` file
//! 6. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
