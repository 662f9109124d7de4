//! Stop gate for autonomous coding-agent sessions.
//!
//! Invoked by the host each time an agent tries to end its turn, the gate
//! answers `allow` or `block`: checks must pass, the backlog must be empty, and
//! a per-session counter trips a human-intervention flag if the agent is
//! blocked too many times. The crate keeps a strict split:
//!
//! - **[`core`]**: pure decision logic (counter state machine, selection,
//!   toolset choice, reason text). No I/O.
//! - **[`io`]**: files, child processes, and the hook payload.
//!
//! [`gate`] wires them into a single decision; [`status`] offers a read-only
//! view for operators.

pub mod core;
pub mod exit_codes;
pub mod gate;
pub mod io;
pub mod logging;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
