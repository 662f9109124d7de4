//! Orchestration for a single stop-gate decision.
//!
//! Evaluates the chain fresh on every call, holding no state beyond the
//! persisted counter:
//!
//! 1. escalation flag present -> allow
//! 2. first failing check -> block (counter untouched)
//! 3. no `TODO` item -> reset counter, allow
//! 4. otherwise count the block; past the limit raise the flag and allow

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::policy::{BacklogStep, advance};
use crate::core::report::{self, InstructionTemplate};
use crate::core::toolset::select_toolset;
use crate::core::types::Decision;
use crate::io::backlog::{Backlog, FileBacklog};
use crate::io::checks::{CommandRunner, ShellRunner, probe_available, run_checks};
use crate::io::config::{GateConfig, ToolsetsConfig, resolve};
use crate::io::flag::{EscalationFlag, FileFlag};
use crate::io::state_store::{FileStateStore, StateStore};

/// Bytes of each output stream kept in memory per char quoted in a report.
///
/// UTF-8 needs at most four bytes per char, so this always covers the window.
const TAIL_BYTES_PER_CHAR: usize = 4;

/// Decision knobs, resolved from [`GateConfig`].
#[derive(Debug, Clone)]
pub struct GatePolicy {
    pub max_blocks_per_session: u32,
    pub report_tail_chars: usize,
    pub toolsets: ToolsetsConfig,
    pub instruction: InstructionTemplate,
    /// Backlog location as shown to the agent.
    pub backlog_label: String,
}

impl GatePolicy {
    pub fn from_config(cfg: &GateConfig) -> Result<Self> {
        Ok(Self {
            max_blocks_per_session: cfg.max_blocks_per_session,
            report_tail_chars: cfg.report_tail_chars,
            toolsets: cfg.toolsets.clone(),
            instruction: cfg.instruction_template()?,
            backlog_label: cfg.paths.backlog.display().to_string(),
        })
    }
}

/// The decision engine with its collaborators injected.
pub struct Gate<S, B, R, F> {
    pub policy: GatePolicy,
    pub state_store: S,
    pub backlog: B,
    pub runner: R,
    pub flag: F,
}

/// The gate wired to the real filesystem and shell.
pub type FileGate = Gate<FileStateStore, FileBacklog, ShellRunner, FileFlag>;

impl FileGate {
    /// Wire file-backed collaborators rooted at `root`.
    pub fn from_config(root: &Path, cfg: &GateConfig) -> Result<Self> {
        Ok(Gate {
            policy: GatePolicy::from_config(cfg)?,
            state_store: FileStateStore::new(resolve(root, &cfg.paths.state)),
            backlog: FileBacklog::new(resolve(root, &cfg.paths.backlog)),
            runner: ShellRunner {
                workdir: root.to_path_buf(),
                timeout: cfg.check_timeout(),
                tail_limit_bytes: cfg.report_tail_chars.saturating_mul(TAIL_BYTES_PER_CHAR),
            },
            flag: FileFlag::new(resolve(root, &cfg.paths.escalation_flag)),
        })
    }
}

impl<S, B, R, F> Gate<S, B, R, F>
where
    S: StateStore,
    B: Backlog,
    R: CommandRunner,
    F: EscalationFlag,
{
    /// Decide whether `session_id` may stop.
    ///
    /// Errors only when persisting the counter or raising the flag fails.
    #[instrument(skip(self))]
    pub fn decide(&self, session_id: &str) -> Result<Decision> {
        if self.flag.exists() {
            info!("escalation flag present, allowing stop");
            return Ok(Decision::allow(report::escalation_flag_present(
                &self.flag.location(),
            )));
        }

        let available = probe_available(&self.runner, &self.policy.toolsets.probe);
        let toolset = select_toolset(available);
        debug!(?toolset, "toolset selected");
        let commands = self.policy.toolsets.commands(toolset);
        if let Some(failed) = run_checks(&self.runner, commands) {
            info!(command = %failed.command, "blocking on failed check");
            return Ok(Decision::block(report::check_failed(
                &failed,
                self.policy.report_tail_chars,
            )));
        }

        let state = self.state_store.load(session_id);
        let prior = state.blocks;
        let (state, step) = advance(
            state,
            self.backlog.next_todo(),
            self.policy.max_blocks_per_session,
        );
        self.state_store
            .save(&state)
            .context("persist session state")?;
        debug!(prior, blocks = state.blocks, "session counter updated");

        match step {
            BacklogStep::Complete => {
                info!("backlog complete, allowing stop");
                Ok(Decision::allow(report::BACKLOG_COMPLETE))
            }
            BacklogStep::Escalate => {
                warn!(
                    blocks = state.blocks,
                    limit = self.policy.max_blocks_per_session,
                    "safety limit exceeded, escalating"
                );
                self.flag
                    .raise(&report::escalation_report(
                        &state.session_id,
                        state.blocks,
                        self.policy.max_blocks_per_session,
                    ))
                    .context("raise escalation flag")?;
                Ok(Decision::allow(report::MAX_BLOCKS_REACHED))
            }
            BacklogStep::Continue(item) => {
                info!(item = %item.id, blocks = state.blocks, "blocking on pending backlog item");
                let instruction = self
                    .policy
                    .instruction
                    .render(&item, &self.policy.backlog_label)?;
                Ok(Decision::block(report::backlog_pending(&item, &instruction)))
            }
        }
    }
}
