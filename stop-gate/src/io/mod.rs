//! I/O adapters for the stop gate: files, processes, and the hook payload.

pub mod atomic;
pub mod backlog;
pub mod checks;
pub mod config;
pub mod flag;
pub mod hook;
pub mod process;
pub mod state_store;
