// src/dag/graph.rs

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::model::ConfigFile;
use crate::dag::dependency::Dependency;
use crate::errors::{Result, UnitdagError};
use crate::unit::{Status, Unit};

/// All units of a run, keyed by their unique name.
///
/// Dependency references are resolved against this map lazily, each time a
/// unit is evaluated, so a dangling reference only surfaces once the
/// scheduler reaches the unit that holds it.
#[derive(Debug, Default)]
pub struct UnitGraph {
    units: HashMap<String, Arc<Unit>>,
}

impl UnitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a validated [`ConfigFile`].
    ///
    /// Units get their order from their position in the document, and the
    /// `[default]` environment is merged under each unit's own.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut graph = Self::new();
        for (order, (name, unit_cfg)) in cfg.unit.iter().enumerate() {
            let mut unit_cfg = unit_cfg.clone();
            unit_cfg.environment = unit_cfg.effective_environment(&cfg.default);
            graph.insert(Unit::new(name.clone(), order, unit_cfg)?)?;
        }
        Ok(graph)
    }

    pub fn from_units(units: impl IntoIterator<Item = Unit>) -> Result<Self> {
        let mut graph = Self::new();
        for unit in units {
            graph.insert(unit)?;
        }
        Ok(graph)
    }

    /// Add a unit. Names are the addressing key, so a duplicate is refused.
    pub fn insert(&mut self, unit: Unit) -> Result<()> {
        if self.units.contains_key(unit.name()) {
            return Err(UnitdagError::ConfigError(format!(
                "duplicate unit name '{}'",
                unit.name()
            )));
        }
        self.units.insert(unit.name().to_string(), Arc::new(unit));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Unit>> {
        self.units.get(name)
    }

    /// All units, sorted by their assigned order.
    pub fn units(&self) -> Vec<Arc<Unit>> {
        let mut units: Vec<Arc<Unit>> = self.units.values().cloned().collect();
        units.sort_by_key(|u| u.order());
        units
    }

    /// Decide whether `unit` can be launched now.
    ///
    /// Only a `NotRun` unit can be runnable. Each dependency must have reached
    /// the status its polarity wants. If one has reached the opposite
    /// terminal status, or was itself skipped, the unit can never run and is
    /// marked `DependenciesNotMet` here. A dependency that is still pending
    /// or running just means "not yet".
    pub fn is_runnable(&self, unit: &Unit) -> Result<bool> {
        if unit.status() != Status::NotRun {
            return Ok(false);
        }

        for raw in unit.dependencies() {
            let dep = Dependency::parse(raw);
            let target = self.units.get(&dep.name).ok_or_else(|| {
                UnitdagError::UnknownDependency {
                    unit: unit.name().to_string(),
                    dependency: raw.clone(),
                }
            })?;

            let dep_status = target.status();
            if dep_status == dep.blocking() || dep_status == Status::DependenciesNotMet {
                let marked = unit.results().atomic(|r| {
                    if r.status() == Status::NotRun {
                        r.set_status(Status::DependenciesNotMet);
                        true
                    } else {
                        false
                    }
                });
                if marked {
                    info!(
                        unit = %unit.name(),
                        dependency = %raw,
                        dependency_status = %dep_status,
                        "dependency cannot be met; skipping unit"
                    );
                }
                return Ok(false);
            }
            if dep_status != dep.wanted() {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Every unit that can be launched right now, in order.
    ///
    /// Passes are repeated while a pass skips some unit, so that a skip
    /// travels down a whole chain of dependents in one call no matter which
    /// order the map hands the units out in.
    pub fn ready_to_run(&self) -> Result<Vec<Arc<Unit>>> {
        loop {
            let mut ready = Vec::new();
            let mut newly_skipped = 0usize;

            for unit in self.units.values() {
                let was_waiting = unit.status() == Status::NotRun;
                if self.is_runnable(unit)? {
                    ready.push(Arc::clone(unit));
                } else if was_waiting && unit.status() == Status::DependenciesNotMet {
                    newly_skipped += 1;
                }
            }

            if newly_skipped == 0 {
                ready.sort_by_key(|u| u.order());
                return Ok(ready);
            }
            debug!(newly_skipped, "units skipped; re-evaluating dependents");
        }
    }

    /// True once no unit is waiting to run.
    pub fn is_finished(&self) -> bool {
        self.units
            .values()
            .all(|u| u.status() != Status::NotRun)
    }

    /// Dump of every unit still waiting, with the state of each dependency.
    pub fn pending_report(&self) -> String {
        let mut out = String::new();
        for unit in self.units() {
            if unit.status() != Status::NotRun {
                continue;
            }
            let _ = writeln!(out, "{}: {}", unit.name(), unit.status());
            for raw in unit.dependencies() {
                let dep = Dependency::parse(raw);
                match self.units.get(&dep.name) {
                    Some(target) => {
                        let _ = writeln!(
                            out,
                            "\t- {} ({}, needs {})",
                            raw.trim(),
                            target.status(),
                            dep.wanted()
                        );
                    }
                    None => {
                        let _ = writeln!(out, "\t- {} (unknown unit)", raw.trim());
                    }
                }
            }
        }
        out
    }
}
