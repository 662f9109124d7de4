//! Deterministic, pure logic behind the stop gate.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod policy;
pub mod report;
pub mod selector;
pub mod toolset;
pub mod types;
