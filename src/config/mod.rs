// src/config/mod.rs

//! Rule file loading and validation.
//!
//! - [`model`] holds the YAML-backed records and the compiled [`Rule`].
//! - [`loader`] reads a rule file from disk.
//! - [`validate`] checks rule invariants and compiles glob patterns.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str, DEFAULT_CONFIG_PATH};
pub use model::{ConfigFile, RawConfigFile, RawRule, Rule};
pub use validate::validate_config;
