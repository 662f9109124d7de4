//! Shared deterministic types for the stop gate.
//!
//! These types define the contracts between the decision engine and its
//! collaborators. They carry no I/O and serialize to stable JSON.

use serde::{Deserialize, Serialize};

/// Outcome of a single gate invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The agent may stop.
    Allow,
    /// The agent must keep working.
    Block,
}

/// The payload emitted on stdout: exactly `decision` and `reason`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub decision: Verdict,
    pub reason: String,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Allow,
            reason: reason.into(),
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Verdict::Block,
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        self.decision == Verdict::Allow
    }
}

/// Persisted per-session counter of backlog-driven blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: String,
    #[serde(default)]
    pub blocks: u32,
}

impl SessionState {
    /// Fresh state for a session that has never been blocked.
    pub fn fresh(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            blocks: 0,
        }
    }
}

/// Backlog item status. Only `TODO` is acted upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum ItemStatus {
    Todo,
    Done,
    Other(String),
}

impl From<String> for ItemStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "TODO" => Self::Todo,
            "DONE" => Self::Done,
            _ => Self::Other(value),
        }
    }
}

impl From<ItemStatus> for String {
    fn from(value: ItemStatus) -> Self {
        match value {
            ItemStatus::Todo => "TODO".to_string(),
            ItemStatus::Done => "DONE".to_string(),
            ItemStatus::Other(raw) => raw,
        }
    }
}

/// One entry of the externally maintained backlog.
///
/// Built leniently from raw JSON by the backlog reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacklogItem {
    pub id: String,
    pub title: String,
    pub status: ItemStatus,
}

impl BacklogItem {
    pub fn is_todo(&self) -> bool {
        self.status == ItemStatus::Todo
    }
}

/// Captured result of one check command. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub command: String,
    /// `None` when the command was killed, timed out, or never started.
    pub exit_status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl CheckResult {
    pub fn passed(&self) -> bool {
        !self.timed_out && self.exit_status == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_serializes_with_exactly_two_fields() {
        let json = serde_json::to_string(&Decision::block("keep going")).expect("serialize");
        assert_eq!(json, r#"{"decision":"block","reason":"keep going"}"#);
    }

    #[test]
    fn status_match_is_case_sensitive() {
        assert_eq!(ItemStatus::from("TODO".to_string()), ItemStatus::Todo);
        assert_eq!(
            ItemStatus::from("todo".to_string()),
            ItemStatus::Other("todo".to_string())
        );
        assert_eq!(String::from(ItemStatus::Done), "DONE");
    }

    #[test]
    fn timed_out_check_never_passes() {
        let result = CheckResult {
            command: "sleep 99".to_string(),
            exit_status: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        };
        assert!(!result.passed());
    }
}
