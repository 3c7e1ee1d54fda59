// src/report.rs

//! Plain-text reporting: status transitions while a run is in progress and
//! a summary once it is over.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

use crate::dag::UnitGraph;
use crate::unit::{Status, Unit};

/// Update handler that logs each status change of a unit once.
///
/// Output appends also arrive here; they are counted but not logged.
#[derive(Debug, Default)]
pub struct StatusReporter {
    seen: Mutex<HashMap<String, Status>>,
    updates: AtomicUsize,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update for `unit`. Returns `true` if its status changed
    /// since the last update seen for it.
    pub fn observe(&self, unit: &Unit) -> bool {
        self.updates.fetch_add(1, Ordering::Relaxed);

        // Status is read under `seen` so that two readers of the same unit
        // cannot record their observations out of order.
        let (status, changed) = {
            let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
            let status = unit.status();
            let previous = seen.insert(unit.name().to_string(), status);
            (status, previous != Some(status))
        };

        if changed {
            if status.is_ok() {
                info!(unit = %unit.name(), status = %status, "unit status changed");
            } else {
                warn!(unit = %unit.name(), status = %status, "unit status changed");
            }
        }
        changed
    }

    /// Total number of updates received.
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSummary {
    pub name: String,
    pub status: Status,
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Final state of every unit, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub units: Vec<UnitSummary>,
}

impl RunSummary {
    pub fn from_graph(graph: &UnitGraph) -> Self {
        let units = graph
            .units()
            .iter()
            .map(|unit| {
                let snap = unit.snapshot();
                UnitSummary {
                    name: unit.name().to_string(),
                    status: snap.status,
                    return_code: snap.return_code,
                    stdout: snap.stdout,
                    stderr: snap.stderr,
                }
            })
            .collect();
        Self { units }
    }

    /// True if every unit succeeded.
    pub fn all_ok(&self) -> bool {
        self.units.iter().all(|u| u.status == Status::Succeeded)
    }

    pub fn render(&self, show_output: bool) -> String {
        let width = self.units.iter().map(|u| u.name.len()).max().unwrap_or(0);
        let mut out = String::new();

        for unit in &self.units {
            let mark = if unit.status.is_ok() { "ok  " } else { "FAIL" };
            let _ = write!(out, "[{mark}] {:<width$}  {}", unit.name, unit.status);
            if matches!(unit.status, Status::Succeeded | Status::Failed) {
                let _ = write!(out, " (exit {})", unit.return_code);
            }
            out.push('\n');

            if show_output {
                write_output(&mut out, "stdout", &unit.stdout);
                write_output(&mut out, "stderr", &unit.stderr);
            }
        }
        out
    }
}

fn write_output(out: &mut String, label: &str, text: &str) {
    for line in text.lines() {
        let _ = writeln!(out, "    {label} | {line}");
    }
}
