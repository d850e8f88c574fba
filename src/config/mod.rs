//! Configuration loading.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Layering in [`merger`]
//!
//! # Example
//!
//! ```
//! use orchard_recipes::config::load_merged_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let dir = temp.path().join(".orchard");
//! fs::create_dir_all(&dir).unwrap();
//! fs::write(dir.join("config.yml"), "tenant: Blog").unwrap();
//!
//! let config = load_merged_config(temp.path()).unwrap();
//! assert_eq!(config.tenant, "Blog");
//! ```

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    find_project_root, load_config, load_config_file, load_merged_config, ConfigPaths, CONFIG_DIR,
};
pub use merger::{merge_into, merge_layers};
pub use schema::{OrchardConfig, DEFAULT_SETUP_FEATURES};
