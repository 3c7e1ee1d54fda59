// src/errors.rs

//! Crate-wide error types.
//!
//! Only configuration problems, deadlocks and processes that could not be
//! launched surface here. A unit that ran and did not meet its expectations
//! is not an error: it ends up with `Status::Failed` and the graph routes
//! around it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnitdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("dependency not found for '{unit}': '{dependency}'")]
    UnknownDependency { unit: String, dependency: String },

    #[error("deadlock detected: not finished, but not ready to run\n{0}")]
    Deadlock(String),

    #[error("received {count} error(s) running units, the last of which is: {last}")]
    UnitErrors { count: usize, last: Box<UnitdagError> },

    #[error("error running unit '{unit}': {source}")]
    Launch {
        unit: String,
        #[source]
        source: LaunchError,
    },

    #[error("worker for unit '{unit}' did not complete: {source}")]
    Worker {
        unit: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Why `Unit::run` could not get a process going.
///
/// These are environment problems (missing binary, exhausted file
/// descriptors), distinct from a unit that ran and failed.
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("couldn't open standard {stream} for command {command:?} {args:?}")]
    StreamUnavailable {
        command: String,
        args: Vec<String>,
        stream: &'static str,
    },

    #[error("couldn't start command {command:?} {args:?}: {source}")]
    Spawn {
        command: String,
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, UnitdagError>;
