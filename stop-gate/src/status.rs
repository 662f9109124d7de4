//! Read-only snapshot for `stop-gate status`.

use serde::Serialize;

use crate::core::types::BacklogItem;
use crate::io::backlog::Backlog;
use crate::io::flag::EscalationFlag;
use crate::io::state_store::StateStore;

/// What the gate would see for a session, without running any checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateStatus {
    pub session_id: String,
    pub blocks: u32,
    pub max_blocks_per_session: u32,
    pub escalated: bool,
    pub next_item: Option<BacklogItem>,
}

pub fn gate_status<S: StateStore, B: Backlog, F: EscalationFlag>(
    session_id: &str,
    max_blocks_per_session: u32,
    state_store: &S,
    backlog: &B,
    flag: &F,
) -> GateStatus {
    let state = state_store.load(session_id);
    GateStatus {
        session_id: state.session_id,
        blocks: state.blocks,
        max_blocks_per_session,
        escalated: flag.exists(),
        next_item: backlog.next_todo(),
    }
}
