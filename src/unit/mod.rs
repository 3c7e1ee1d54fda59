// src/unit/mod.rs

//! The unit entity: one named command invocation plus its results.
//!
//! - [`status`] is the lifecycle enum.
//! - [`results`] holds the mutex-guarded outcome record.
//!
//! Execution lives in [`crate::exec`]; dependency resolution in
//! [`crate::dag`].

pub mod results;
pub mod status;

use std::collections::BTreeMap;

use regex::Regex;

use crate::config::model::UnitConfig;
use crate::errors::{Result, UnitdagError};

pub use results::{ResultFields, ResultRecord, ResultSnapshot};
pub use status::Status;

/// A named, dependency-constrained external command.
///
/// Everything except the results record is fixed at construction.
#[derive(Debug)]
pub struct Unit {
    name: String,
    order: usize,
    command: String,
    args: Vec<String>,
    environment: BTreeMap<String, String>,
    dependencies: Vec<String>,
    expected_return_code: i32,
    expected_stdout: Option<Regex>,
    expected_stderr: Option<Regex>,
    results: ResultRecord,
}

impl Unit {
    /// Build a unit from its configured definition.
    ///
    /// Fails if the command is blank or an expectation pattern does not
    /// compile. Dependency names are not checked here; they are resolved
    /// against the graph when the scheduler evaluates the unit.
    pub fn new(name: impl Into<String>, order: usize, cfg: UnitConfig) -> Result<Self> {
        let name = name.into();

        if cfg.command.trim().is_empty() {
            return Err(UnitdagError::ConfigError(format!(
                "unit '{name}' has an empty `command`"
            )));
        }

        let expected_stdout = compile_pattern(&name, "expected_stdout_regex", cfg.expected_stdout_regex)?;
        let expected_stderr = compile_pattern(&name, "expected_stderr_regex", cfg.expected_stderr_regex)?;

        Ok(Self {
            name,
            order,
            command: cfg.command,
            args: cfg.args,
            environment: cfg.environment,
            dependencies: cfg.dependencies,
            expected_return_code: cfg.expected_return_code,
            expected_stdout,
            expected_stderr,
            results: ResultRecord::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position assigned by the loader; only used to keep listings stable.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Raw dependency references, possibly prefixed with `!` or `-`.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn expected_return_code(&self) -> i32 {
        self.expected_return_code
    }

    pub fn expected_stdout(&self) -> Option<&Regex> {
        self.expected_stdout.as_ref()
    }

    pub fn expected_stderr(&self) -> Option<&Regex> {
        self.expected_stderr.as_ref()
    }

    pub fn status(&self) -> Status {
        self.results.status()
    }

    pub fn stdout(&self) -> String {
        self.results.stdout()
    }

    pub fn stderr(&self) -> String {
        self.results.stderr()
    }

    pub fn return_code(&self) -> i32 {
        self.results.return_code()
    }

    pub fn snapshot(&self) -> ResultSnapshot {
        self.results.snapshot()
    }

    pub fn results(&self) -> &ResultRecord {
        &self.results
    }

    /// Decide the final status once the process has exited.
    ///
    /// A `Failed` already recorded (stream error, wait error) is kept.
    /// Otherwise the exit code must equal the expected one and each
    /// configured pattern must be found in the full captured text.
    pub(crate) fn evaluate_success(&self) {
        let snap = self.results.snapshot();
        if snap.status == Status::Failed {
            return;
        }
        if snap.return_code != self.expected_return_code {
            self.results.set_status(Status::Failed);
            return;
        }
        if let Some(pattern) = &self.expected_stdout {
            if !pattern.is_match(&snap.stdout) {
                self.results.set_status(Status::Failed);
                return;
            }
        }
        if let Some(pattern) = &self.expected_stderr {
            if !pattern.is_match(&snap.stderr) {
                self.results.set_status(Status::Failed);
                return;
            }
        }
        self.results.succeed_if_not_failed();
    }
}

fn compile_pattern(unit: &str, field: &str, pattern: Option<String>) -> Result<Option<Regex>> {
    match pattern {
        None => Ok(None),
        Some(p) if p.is_empty() => Ok(None),
        Some(p) => Regex::new(&p).map(Some).map_err(|e| {
            UnitdagError::ConfigError(format!("unit '{unit}' has an invalid `{field}`: {e}"))
        }),
    }
}
