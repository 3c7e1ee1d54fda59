// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [default.environment]
/// LANG = "C"
///
/// [unit."Clear Logs"]
/// command = "sh"
/// args = ["-c", "rm -f logs/*.txt; exit 7"]
/// expected_return_code = 7
///
/// [unit."Update Bundler"]
/// command = "bin/bundle"
/// args = ["update"]
/// dependencies = ["Clear Logs"]
/// environment = { RAILS_ENV = "development" }
/// expected_stdout_regex = "Bundle complete!"
/// ```
///
/// Units keep the order in which they appear in the document; that order is
/// what reports are sorted by.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub default: DefaultSection,
    pub unit: Vec<(String, UnitConfig)>,
}

impl ConfigFile {
    pub fn unit(&self, name: &str) -> Option<&UnitConfig> {
        self.unit.iter().find(|(n, _)| n == name).map(|(_, u)| u)
    }

    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.unit.iter().map(|(n, _)| n.as_str())
    }
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct DefaultSection {
    /// Variables every unit gets unless it declares the same key itself.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

/// `[unit.<name>]` section.
///
/// The camelCase spellings (`expectedReturnCode`, `expectedStdOutRegex`,
/// `expectedStdErrRegex`) are accepted as aliases.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct UnitConfig {
    /// Executable to run. Not passed through a shell.
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Extra variables laid over the ambient environment.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,

    /// Names of units that must succeed first. A leading `!` or `-` inverts
    /// the requirement: the named unit must fail.
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default, alias = "expectedReturnCode")]
    pub expected_return_code: i32,

    /// Pattern that must be found in the full captured stdout.
    #[serde(default, alias = "expectedStdOutRegex")]
    pub expected_stdout_regex: Option<String>,

    /// Pattern that must be found in the full captured stderr.
    #[serde(default, alias = "expectedStdErrRegex")]
    pub expected_stderr_regex: Option<String>,
}

impl UnitConfig {
    /// Environment with `[default].environment` underneath this unit's own
    /// variables.
    pub fn effective_environment(
        &self,
        defaults: &DefaultSection,
    ) -> BTreeMap<String, String> {
        let mut env = defaults.environment.clone();
        env.extend(
            self.environment
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        env
    }
}
