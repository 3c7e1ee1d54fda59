// src/config/mod.rs

//! Configuration loading and validation for unitdag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate what can be checked up front, and lint the rest (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, DefaultSection, UnitConfig};
pub use validate::{lint, validate_config, ConfigWarning};
