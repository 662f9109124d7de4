//! Stable exit codes for stop-gate CLI commands.
//!
//! The allow/block decision is never encoded here; it travels in the stdout
//! payload.

/// A decision (or command output) was produced.
pub const OK: i32 = 0;
/// Malformed hook payload, invalid config, or a failed state/flag write.
pub const INVALID: i32 = 1;
