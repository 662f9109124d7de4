//! Capability-checked choice between the preferred and fallback check sets.

use serde::Serialize;

/// Which configured command list drives the checks for this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolset {
    Preferred,
    Fallback,
}

/// Pick the toolset from the result of the availability probe.
pub fn select_toolset(preferred_available: bool) -> Toolset {
    if preferred_available {
        Toolset::Preferred
    } else {
        Toolset::Fallback
    }
}
