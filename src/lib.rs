// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod unit;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::config::validate::{lint, ConfigWarning};
use crate::dag::UnitGraph;
use crate::report::{RunSummary, StatusReporter};

pub use crate::dag::{Dependency, Polarity};
pub use crate::errors::{LaunchError, UnitdagError};
pub use crate::unit::{ResultRecord, Status, Unit};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + linting
/// - graph construction
/// - the scheduler, with a [`StatusReporter`] as update handler
/// - the final summary on stdout
///
/// Returns `Ok(true)` when every unit succeeded (or on `--dry-run`),
/// `Ok(false)` when the run completed but some unit did not succeed.
pub async fn run(args: CliArgs) -> Result<bool> {
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading units from {}", config_path.display()))?;

    let warnings = lint(&cfg);

    if args.dry_run {
        print_dry_run(&cfg, &warnings);
        return Ok(true);
    }

    for w in &warnings {
        warn!(warning = %w, "configuration will stop the run early");
    }

    let graph = UnitGraph::from_config(&cfg)?;
    let reporter = Arc::new(StatusReporter::new());
    let handler = {
        let reporter = Arc::clone(&reporter);
        move |unit: &Unit| {
            reporter.observe(unit);
        }
    };

    let outcome = graph.run_all(handler).await;
    debug!(updates = reporter.updates(), "run complete");

    let summary = RunSummary::from_graph(&graph);
    print!("{}", summary.render(args.show_output));

    outcome.context("running units")?;
    Ok(summary.all_ok())
}

/// Simple dry-run output: print units, deps and commands.
fn print_dry_run(cfg: &ConfigFile, warnings: &[ConfigWarning]) {
    println!("unitdag dry-run");
    if !cfg.default.environment.is_empty() {
        println!("  default.environment = {:?}", cfg.default.environment);
    }
    println!();

    println!("units ({}):", cfg.unit.len());
    for (name, unit) in cfg.unit.iter() {
        println!("  - {name}");
        println!("      command: {} {:?}", unit.command, unit.args);
        if !unit.dependencies.is_empty() {
            println!("      dependencies: {:?}", unit.dependencies);
        }
        if !unit.environment.is_empty() {
            println!("      environment: {:?}", unit.environment);
        }
        if unit.expected_return_code != 0 {
            println!("      expected_return_code: {}", unit.expected_return_code);
        }
        if let Some(ref p) = unit.expected_stdout_regex {
            println!("      expected_stdout_regex: {p}");
        }
        if let Some(ref p) = unit.expected_stderr_regex {
            println!("      expected_stderr_regex: {p}");
        }
    }

    if !warnings.is_empty() {
        println!();
        println!("warnings ({}):", warnings.len());
        for w in warnings {
            println!("  - {w}");
        }
    }

    debug!("dry-run complete (no execution)");
}
