//! Human-readable reasons attached to gate decisions.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::types::{BacklogItem, CheckResult};

/// Default size of the stdout/stderr tail quoted in a failed-check reason.
pub const DEFAULT_REPORT_TAIL_CHARS: usize = 6000;

/// Default remediation instruction appended to a backlog block.
pub const DEFAULT_INSTRUCTION: &str = "Execute: /bmad-cycle {{ id }}\n\n\
After completion, mark the story as DONE in {{ backlog_path }}";

pub const BACKLOG_COMPLETE: &str = "All checks passed and backlog is complete.";
pub const MAX_BLOCKS_REACHED: &str = "Max blocks reached. Human intervention required.";

/// Return the last `max_chars` characters of `text`.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((idx, _)) => &text[idx..],
        None => text,
    }
}

pub fn escalation_flag_present(flag_location: &str) -> String {
    format!("Human intervention required. Check {flag_location}")
}

/// Block reason for a failing check, with bounded output tails.
pub fn check_failed(result: &CheckResult, tail: usize) -> String {
    let status = match (result.timed_out, result.exit_status) {
        (true, _) => "timed out".to_string(),
        (false, Some(code)) => format!("exit status {code}"),
        (false, None) => "terminated without exit status".to_string(),
    };
    format!(
        "Check failed: {} ({status})\n\nFix the errors before continuing.\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
        result.command,
        tail_chars(&result.stdout, tail),
        tail_chars(&result.stderr, tail),
    )
}

/// Block reason for a pending backlog item.
pub fn backlog_pending(item: &BacklogItem, instruction: &str) -> String {
    format!(
        "Backlog not complete. Next story: {} - {}\n\n{instruction}",
        item.id, item.title
    )
}

/// Contents of the escalation flag file.
pub fn escalation_report(session_id: &str, blocks: u32, max_blocks: u32) -> String {
    format!(
        "# Human Intervention Required\n\n\
Autopilot has reached the maximum number of blocks per session.\n\
This usually indicates:\n\
- Tests are failing repeatedly\n\
- Backlog items are not being marked as DONE\n\
- There's a configuration issue\n\n\
Please review the backlog, tests, and recent changes.\n\n\
Session: {session_id}\n\
Blocks: {blocks} (limit {max_blocks})\n"
    )
}

/// Remediation instruction template (minijinja syntax).
///
/// Receives `id`, `title` and `backlog_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionTemplate {
    source: String,
}

impl InstructionTemplate {
    /// Compile-check the template source.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let env = Environment::new();
        env.template_from_str(&source)
            .context("parse backlog instruction template")?;
        Ok(Self { source })
    }

    pub fn render(&self, item: &BacklogItem, backlog_path: &str) -> Result<String> {
        Environment::new()
            .render_str(
                &self.source,
                context! {
                    id => item.id,
                    title => item.title,
                    backlog_path => backlog_path,
                },
            )
            .context("render backlog instruction")
    }
}

impl Default for InstructionTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}
