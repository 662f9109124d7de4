//! Session counter state machine for backlog-driven blocks.
//!
//! The gate evaluates a linear chain on every call:
//! escalation flag -> checks -> backlog. Only the last link touches the
//! persisted counter, and that transition lives here as a pure function so the
//! orchestrator can persist whatever state it returns.

use crate::core::types::{BacklogItem, SessionState};

/// Default safety limit on backlog-driven blocks per session.
pub const DEFAULT_MAX_BLOCKS_PER_SESSION: u32 = 200;

/// What the backlog link of the chain resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BacklogStep {
    /// No `TODO` item remains; the counter is reset and the stop is allowed.
    Complete,
    /// Work remains; the stop is blocked with guidance on this item.
    Continue(BacklogItem),
    /// The counter exceeded the safety limit; escalate and allow the stop.
    Escalate,
}

/// Advance the session counter given the next pending backlog item.
///
/// The counter is incremented before the limit is compared, so with a limit of
/// 200 the 201st consecutive block escalates.
pub fn advance(
    state: SessionState,
    next: Option<BacklogItem>,
    max_blocks: u32,
) -> (SessionState, BacklogStep) {
    let Some(item) = next else {
        return (SessionState::fresh(state.session_id), BacklogStep::Complete);
    };

    let state = SessionState {
        blocks: state.blocks.saturating_add(1),
        ..state
    };
    if state.blocks > max_blocks {
        return (state, BacklogStep::Escalate);
    }
    (state, BacklogStep::Continue(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ItemStatus;

    fn todo(id: &str) -> BacklogItem {
        BacklogItem {
            id: id.to_string(),
            title: String::new(),
            status: ItemStatus::Todo,
        }
    }

    fn state(blocks: u32) -> SessionState {
        SessionState {
            session_id: "sess".to_string(),
            blocks,
        }
    }

    #[test]
    fn empty_backlog_resets_counter() {
        let (next, step) = advance(state(17), None, 200);
        assert_eq!(next, state(0));
        assert_eq!(step, BacklogStep::Complete);
    }

    #[test]
    fn pending_item_increments_by_one() {
        let (next, step) = advance(state(0), Some(todo("S1")), 200);
        assert_eq!(next, state(1));
        assert_eq!(step, BacklogStep::Continue(todo("S1")));
    }

    #[test]
    fn reaching_the_limit_still_blocks() {
        let (next, step) = advance(state(199), Some(todo("S1")), 200);
        assert_eq!(next.blocks, 200);
        assert!(matches!(step, BacklogStep::Continue(_)));
    }

    #[test]
    fn exceeding_the_limit_escalates() {
        let (next, step) = advance(state(200), Some(todo("S1")), 200);
        assert_eq!(next.blocks, 201);
        assert_eq!(step, BacklogStep::Escalate);
    }

    #[test]
    fn zero_limit_escalates_on_first_block() {
        let (_, step) = advance(state(0), Some(todo("S1")), 0);
        assert_eq!(step, BacklogStep::Escalate);
    }

    #[test]
    fn counter_saturates_instead_of_wrapping() {
        let (next, step) = advance(state(u32::MAX), Some(todo("S1")), 200);
        assert_eq!(next.blocks, u32::MAX);
        assert_eq!(step, BacklogStep::Escalate);
    }
}
