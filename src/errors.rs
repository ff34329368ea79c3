// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeriveError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("invalid glob pattern '{pattern}' in rule '{rule}': {source}")]
    GlobError {
        rule: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{label}: failed to spawn {command:?}: {source}")]
    SpawnError {
        label: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{label}: command {command:?} failed ({})", describe_exit(.code))]
    CommandFailed {
        label: String,
        command: String,
        code: Option<i32>,
    },

    #[error("Watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    NotifyError(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, DeriveError>;
