// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `unitdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "unitdag",
    version,
    about = "Run commands in parallel, in the order their dependencies allow.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the unit file (TOML).
    ///
    /// Default: `$UNITDAG_CONFIG`, else `Unitdag.toml` in the current
    /// working directory.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `UNITDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the units, but don't execute any commands.
    #[arg(long)]
    pub dry_run: bool,

    /// Include each unit's captured stdout/stderr in the final summary.
    #[arg(long)]
    pub show_output: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
