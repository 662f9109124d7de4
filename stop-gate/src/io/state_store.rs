//! Session counter storage (`.claude/.autopilot_state.json` by default).
//!
//! Loading fails open: any anomaly yields a fresh counter for the requested
//! session. Counter history is lost on corruption, but the gate never stalls
//! on a bad state file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::types::SessionState;
use crate::io::atomic::write_atomic;

/// Persistent, session-scoped block counter.
pub trait StateStore {
    /// Never fails; falls back to [`SessionState::fresh`].
    fn load(&self, session_id: &str) -> SessionState;
    /// Last-writer-wins overwrite.
    fn save(&self, state: &SessionState) -> Result<()>;
}

/// JSON file holding the state of the most recent session.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<SessionState>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("read state {}", self.path.display()));
            }
        };
        let state = serde_json::from_str(&contents)
            .with_context(|| format!("parse state {}", self.path.display()))?;
        Ok(Some(state))
    }
}

impl StateStore for FileStateStore {
    fn load(&self, session_id: &str) -> SessionState {
        debug!(path = %self.path.display(), session_id, "loading session state");
        match self.read() {
            Ok(Some(state)) if state.session_id == session_id => {
                debug!(blocks = state.blocks, "session state loaded");
                state
            }
            Ok(Some(state)) => {
                debug!(stored = %state.session_id, "state belongs to another session");
                SessionState::fresh(session_id)
            }
            Ok(None) => SessionState::fresh(session_id),
            Err(err) => {
                warn!(err = %format!("{err:#}"), "ignoring unreadable session state");
                SessionState::fresh(session_id)
            }
        }
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        debug!(path = %self.path.display(), session_id = %state.session_id, blocks = state.blocks, "writing session state");
        let mut buf = serde_json::to_string_pretty(state).context("serialize session state")?;
        buf.push('\n');
        write_atomic(&self.path, &buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(temp: &tempfile::TempDir) -> FileStateStore {
        FileStateStore::new(temp.path().join(".claude").join(".autopilot_state.json"))
    }

    #[test]
    fn missing_file_yields_fresh_state() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(store(&temp).load("abc"), SessionState::fresh("abc"));
    }

    #[test]
    fn saved_state_is_loaded_for_same_session() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(&temp);
        let state = SessionState {
            session_id: "abc".to_string(),
            blocks: 7,
        };
        store.save(&state).expect("save");
        assert_eq!(store.load("abc"), state);
    }

    #[test]
    fn other_session_starts_from_zero() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(&temp);
        store
            .save(&SessionState {
                session_id: "a".to_string(),
                blocks: 42,
            })
            .expect("save");
        assert_eq!(store.load("b"), SessionState::fresh("b"));
    }

    #[test]
    fn corrupt_file_yields_fresh_state() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(&temp);
        fs::create_dir_all(temp.path().join(".claude")).expect("mkdir");
        fs::write(store.path(), "{not json").expect("write");
        assert_eq!(store.load("abc"), SessionState::fresh("abc"));
    }

    #[test]
    fn negative_counter_is_treated_as_corrupt() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(&temp);
        fs::create_dir_all(temp.path().join(".claude")).expect("mkdir");
        fs::write(store.path(), r#"{"session_id":"abc","blocks":-3}"#).expect("write");
        assert_eq!(store.load("abc").blocks, 0);
    }

    /// Guards the on-disk layout other tooling reads.
    #[test]
    fn state_file_format_is_stable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = store(&temp);
        store
            .save(&SessionState {
                session_id: "abc".to_string(),
                blocks: 2,
            })
            .expect("save");
        let contents = fs::read_to_string(store.path()).expect("read");
        assert_eq!(contents, "{\n  \"session_id\": \"abc\",\n  \"blocks\": 2\n}\n");
    }
}
