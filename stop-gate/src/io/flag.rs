//! Human-intervention sentinel (`.claude/HUMAN_NEEDED.md` by default).
//!
//! Existence alone is significant. The gate creates the file when the safety
//! limit trips; only a human removes it.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;

use crate::io::atomic::write_atomic;

pub trait EscalationFlag {
    fn exists(&self) -> bool;
    /// Write the explanatory report, overwriting any previous one.
    fn raise(&self, message: &str) -> Result<()>;
    /// Where a human should look, quoted in the allow reason.
    fn location(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileFlag {
    path: PathBuf,
}

impl FileFlag {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EscalationFlag for FileFlag {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn raise(&self, message: &str) -> Result<()> {
        warn!(path = %self.path.display(), "raising human intervention flag");
        write_atomic(&self.path, message)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn raise_creates_flag_with_message() {
        let temp = tempfile::tempdir().expect("tempdir");
        let flag = FileFlag::new(temp.path().join(".claude").join("HUMAN_NEEDED.md"));
        assert!(!flag.exists());

        flag.raise("first").expect("raise");
        flag.raise("second").expect("re-raise");

        assert!(flag.exists());
        assert_eq!(fs::read_to_string(flag.path()).expect("read"), "second");
    }
}
