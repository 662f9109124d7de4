//! Hook payload codec: one JSON object in on stdin, one decision out on stdout.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::types::Decision;

pub const UNKNOWN_SESSION: &str = "unknown";

/// Invocation payload. Fields other than `session_id` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
}

impl HookInput {
    pub fn session_id(&self) -> &str {
        self.session_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(UNKNOWN_SESSION)
    }
}

/// Parse the payload. Anything that is not a JSON object is a fatal input error.
pub fn read_input<R: Read>(mut reader: R) -> Result<HookInput> {
    let mut raw = String::new();
    reader
        .read_to_string(&mut raw)
        .context("read hook payload from stdin")?;
    serde_json::from_str(&raw).context("parse hook payload")
}

pub fn write_decision<W: Write>(mut writer: W, decision: &Decision) -> Result<()> {
    let payload = serde_json::to_string(decision).context("serialize decision")?;
    writeln!(writer, "{payload}").context("write decision")?;
    writer.flush().context("flush decision")
}
