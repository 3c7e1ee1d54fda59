// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::warn;

use crate::config::model::{ConfigFile, DefaultSection, UnitConfig};
use crate::config::validate::validate_config;
use crate::errors::{Result, UnitdagError};

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_str(&contents)
}

/// Parse a TOML document, keeping `[unit.<name>]` sections in document order.
pub fn parse_str(contents: &str) -> Result<ConfigFile> {
    let mut doc: Table = toml::from_str(contents)?;

    let default: DefaultSection = match doc.remove("default") {
        Some(value) => value.try_into()?,
        None => DefaultSection::default(),
    };

    let units = match doc.remove("unit") {
        Some(Value::Table(t)) => t,
        Some(other) => {
            return Err(UnitdagError::ConfigError(format!(
                "`unit` must be a table of [unit.<name>] sections, found {}",
                other.type_str()
            )));
        }
        None => Table::new(),
    };

    for key in doc.keys() {
        warn!(key = %key, "ignoring unknown top-level config key");
    }

    let mut unit = Vec::with_capacity(units.len());
    for (name, value) in units {
        let cfg: UnitConfig = value.try_into().map_err(|e: toml::de::Error| {
            UnitdagError::ConfigError(format!("unit '{name}': {}", e.message()))
        })?;
        unit.push((name, cfg));
    }

    Ok(ConfigFile { default, unit })
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - an empty unit list,
///   - blank commands,
///   - expectation patterns that do not compile.
///
/// Dependency references are deliberately left alone: they are resolved
/// when the scheduler evaluates each unit. See
/// [`crate::config::validate::lint`] for early warnings about them.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let config = load_from_path(&path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Default config location: `Unitdag.toml` in the working directory, unless
/// `UNITDAG_CONFIG` points somewhere else.
pub fn default_config_path() -> PathBuf {
    std::env::var_os("UNITDAG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Unitdag.toml"))
}
