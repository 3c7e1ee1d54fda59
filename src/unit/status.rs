// src/unit/status.rs

use std::fmt;

/// Lifecycle of a unit within one run.
///
/// `NotRun -> Running -> {Failed, Succeeded}`, or `NotRun ->
/// DependenciesNotMet` when a dependency settles the wrong way. The three
/// end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    #[default]
    NotRun,
    DependenciesNotMet,
    Running,
    Failed,
    Succeeded,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::NotRun,
        Status::DependenciesNotMet,
        Status::Running,
        Status::Failed,
        Status::Succeeded,
    ];

    /// Human-facing label used by reports.
    pub fn label(self) -> &'static str {
        match self {
            Status::NotRun => "Waiting",
            Status::DependenciesNotMet => "Dependencies Not Met",
            Status::Running => "Running",
            Status::Failed => "Failed",
            Status::Succeeded => "Succeeded",
        }
    }

    /// Whether the status is an expected one (`false` flags a unit as
    /// abnormal in reports).
    pub fn is_ok(self) -> bool {
        match self {
            Status::NotRun | Status::Running | Status::Succeeded => true,
            Status::DependenciesNotMet | Status::Failed => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Status::DependenciesNotMet | Status::Failed | Status::Succeeded
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
