// src/config/validate.rs

use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::ConfigFile;
use crate::dag::Dependency;
use crate::errors::{Result, UnitdagError};
use crate::unit::Unit;

/// Run the hard checks against a loaded configuration.
///
/// This checks:
/// - there is at least one unit
/// - every unit builds (non-blank command, patterns compile)
/// - unit names are not blank
///
/// It does **not** reject unknown dependency names or cycles. Those are
/// reported by the scheduler when it gets to them; [`lint`] flags them early.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_has_units(cfg)?;
    for (order, (name, unit)) in cfg.unit.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(UnitdagError::ConfigError(
                "unit names must not be blank".to_string(),
            ));
        }
        Unit::new(name.clone(), order, unit.clone())?;
    }
    Ok(())
}

fn ensure_has_units(cfg: &ConfigFile) -> Result<()> {
    if cfg.unit.is_empty() {
        return Err(UnitdagError::ConfigError(
            "config must contain at least one [unit.<name>] section".to_string(),
        ));
    }
    Ok(())
}

/// Something that will make a run stop early, found before running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    UnknownDependency { unit: String, dependency: String },
    SelfDependency { unit: String },
    Cycle { units: Vec<String> },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownDependency { unit, dependency } => {
                write!(f, "unit '{unit}' depends on unknown unit '{dependency}'")
            }
            ConfigWarning::SelfDependency { unit } => {
                write!(f, "unit '{unit}' depends on itself")
            }
            ConfigWarning::Cycle { units } => {
                write!(f, "dependency cycle between units: {}", units.join(", "))
            }
        }
    }
}

/// Look for references and cycles that will stop a run.
///
/// Polarity does not matter here: a negated dependency still waits for its
/// target to finish, so a cycle through one deadlocks just the same.
pub fn lint(cfg: &ConfigFile) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    // Edge direction: dependency -> dependent.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for name in cfg.unit_names() {
        graph.add_node(name);
    }

    for (name, unit) in cfg.unit.iter() {
        for raw in unit.dependencies.iter() {
            let dep = Dependency::parse(raw);
            match cfg.unit.iter().find(|(n, _)| *n == dep.name) {
                None => warnings.push(ConfigWarning::UnknownDependency {
                    unit: name.clone(),
                    dependency: dep.name.clone(),
                }),
                Some((dep_name, _)) if dep_name == name => {
                    warnings.push(ConfigWarning::SelfDependency { unit: name.clone() });
                }
                Some((dep_name, _)) => {
                    graph.add_edge(dep_name.as_str(), name.as_str(), ());
                }
            }
        }
    }

    for component in tarjan_scc(&graph) {
        if component.len() > 1 {
            let mut units: Vec<String> = component.into_iter().map(str::to_string).collect();
            units.sort();
            warnings.push(ConfigWarning::Cycle { units });
        }
    }

    warnings
}
