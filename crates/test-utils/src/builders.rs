#![allow(dead_code)]

use unitdag::config::{ConfigFile, DefaultSection, UnitConfig};
use unitdag::dag::UnitGraph;

/// Builder for `UnitConfig`.
///
/// Commands run through `sh -c`, which keeps test units short.
pub struct UnitConfigBuilder {
    unit: UnitConfig,
}

impl UnitConfigBuilder {
    /// A unit that runs `script` with `sh -c`.
    pub fn sh(script: &str) -> Self {
        Self::command("sh").arg("-c").arg(script)
    }

    pub fn command(cmd: &str) -> Self {
        Self {
            unit: UnitConfig {
                command: cmd.to_string(),
                ..UnitConfig::default()
            },
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.unit.args.push(arg.to_string());
        self
    }

    pub fn depends_on(mut self, dep: &str) -> Self {
        self.unit.dependencies.push(dep.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.unit
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn expect_code(mut self, code: i32) -> Self {
        self.unit.expected_return_code = code;
        self
    }

    pub fn expect_stdout(mut self, pattern: &str) -> Self {
        self.unit.expected_stdout_regex = Some(pattern.to_string());
        self
    }

    pub fn expect_stderr(mut self, pattern: &str) -> Self {
        self.unit.expected_stderr_regex = Some(pattern.to_string());
        self
    }

    pub fn build(self) -> UnitConfig {
        self.unit
    }
}

/// Builder for `ConfigFile` / `UnitGraph`; units get their order from the
/// order they are added in.
pub struct GraphBuilder {
    config: ConfigFile,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigFile {
                default: DefaultSection::default(),
                unit: Vec::new(),
            },
        }
    }

    pub fn with_unit(mut self, name: &str, unit: UnitConfigBuilder) -> Self {
        self.config.unit.push((name.to_string(), unit.build()));
        self
    }

    pub fn with_default_env(mut self, key: &str, value: &str) -> Self {
        self.config
            .default
            .environment
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn config(self) -> ConfigFile {
        self.config
    }

    pub fn build(self) -> UnitGraph {
        UnitGraph::from_config(&self.config).expect("Failed to build valid graph from builder")
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
