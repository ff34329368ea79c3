// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Default location of the rule file.
pub const DEFAULT_CONFIG_PATH: &str = "./derive.yml";

/// Read and deserialize a rule file without validating it.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Deserialize a YAML rule document.
///
/// An empty document is treated as an empty rule list.
pub fn parse_str(contents: &str) -> Result<RawConfigFile> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let rules: RawConfigFile = serde_yaml::from_str(contents)?;
    Ok(rules)
}

/// Load, validate and compile a rule file.
///
/// This is the entry point the rest of the crate uses: it reads YAML,
/// checks every rule and compiles the glob patterns. Any problem is
/// reported before a single command runs.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(&path)?;
    ConfigFile::try_from(raw)
}
