//! Worker lifecycle states and the transitions between them.

use pwa_cache_core::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle state of the offline asset cache worker.
///
/// `Uninstalled -> Installing -> Installed -> Active`, with any state able
/// to move to `Terminated`. A failed install drops back to `Uninstalled` so
/// the next attempt starts over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    #[default]
    Uninstalled,
    Installing,
    Installed,
    Active,
    Terminated,
}

impl WorkerState {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerState::Uninstalled => "uninstalled",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Active => "active",
            WorkerState::Terminated => "terminated",
        }
    }

    /// State entered when an install event is accepted.
    pub fn begin_install(self) -> Result<Self, Error> {
        match self {
            WorkerState::Uninstalled => Ok(WorkerState::Installing),
            other => Err(Error::InvalidState(format!("cannot install while {other}"))),
        }
    }

    /// State after the install unit of work finished.
    ///
    /// Only an `Installing` worker moves; a worker terminated mid-install
    /// stays terminated.
    pub fn finish_install(self, succeeded: bool) -> Self {
        match (self, succeeded) {
            (WorkerState::Installing, true) => WorkerState::Installed,
            (WorkerState::Installing, false) => WorkerState::Uninstalled,
            (other, _) => other,
        }
    }

    /// State entered when an activate event is accepted.
    pub fn activate(self) -> Result<Self, Error> {
        match self {
            WorkerState::Installed => Ok(WorkerState::Active),
            other => Err(Error::InvalidState(format!("cannot activate while {other}"))),
        }
    }

    /// Whether intercepted requests may be answered from the store.
    pub fn serves_from_cache(self) -> bool {
        self == WorkerState::Active
    }
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
