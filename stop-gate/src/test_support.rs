//! Test-only collaborators and project fixtures for the stop gate.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::types::{BacklogItem, CheckResult, ItemStatus, SessionState};
use crate::io::backlog::Backlog;
use crate::io::checks::CommandRunner;
use crate::io::config::{GateConfig, write_config};
use crate::io::flag::EscalationFlag;
use crate::io::state_store::StateStore;

/// A `TODO` item with a deterministic title.
pub fn todo_item(id: &str) -> BacklogItem {
    BacklogItem {
        id: id.to_string(),
        title: format!("{id} title"),
        status: ItemStatus::Todo,
    }
}

/// A `DONE` item with a deterministic title.
pub fn done_item(id: &str) -> BacklogItem {
    BacklogItem {
        status: ItemStatus::Done,
        ..todo_item(id)
    }
}

/// Single-slot state store mirroring the file store's one-record layout.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    record: RefCell<Option<SessionState>>,
    fail_saves: Cell<bool>,
}

impl MemoryStateStore {
    pub fn seed(&self, state: SessionState) {
        *self.record.borrow_mut() = Some(state);
    }

    pub fn stored(&self) -> Option<SessionState> {
        self.record.borrow().clone()
    }

    pub fn fail_saves(&self) {
        self.fail_saves.set(true);
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, session_id: &str) -> SessionState {
        match self.record.borrow().as_ref() {
            Some(state) if state.session_id == session_id => state.clone(),
            _ => SessionState::fresh(session_id),
        }
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        if self.fail_saves.get() {
            return Err(anyhow!("disk full"));
        }
        *self.record.borrow_mut() = Some(state.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBacklog {
    items: Vec<BacklogItem>,
}

impl MemoryBacklog {
    pub fn with(items: Vec<BacklogItem>) -> Self {
        Self { items }
    }
}

impl Backlog for MemoryBacklog {
    fn next_todo(&self) -> Option<BacklogItem> {
        crate::core::selector::first_todo(&self.items).cloned()
    }
}

#[derive(Debug, Default)]
pub struct MemoryFlag {
    message: RefCell<Option<String>>,
}

impl MemoryFlag {
    pub fn message(&self) -> Option<String> {
        self.message.borrow().clone()
    }
}

impl EscalationFlag for MemoryFlag {
    fn exists(&self) -> bool {
        self.message.borrow().is_some()
    }

    fn raise(&self, message: &str) -> Result<()> {
        *self.message.borrow_mut() = Some(message.to_string());
        Ok(())
    }

    fn location(&self) -> String {
        "memory://HUMAN_NEEDED.md".to_string()
    }
}

/// Command runner where every command passes unless scripted to fail.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    failures: BTreeMap<String, String>,
    seen: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn passing() -> Self {
        Self::default()
    }

    pub fn failing(command: &str, stderr: &str) -> Self {
        Self::default().with_failure(command, stderr)
    }

    /// Make `command` exit 1 with `stderr`.
    pub fn with_failure(mut self, command: &str, stderr: &str) -> Self {
        self.failures
            .insert(command.to_string(), stderr.to_string());
        self
    }

    /// Commands run so far, in order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str) -> Result<CheckResult> {
        self.seen.borrow_mut().push(command.to_string());
        let (exit_status, stderr) = match self.failures.get(command) {
            Some(stderr) => (Some(1), stderr.clone()),
            None => (Some(0), String::new()),
        };
        Ok(CheckResult {
            command: command.to_string(),
            exit_status,
            stdout: String::new(),
            stderr,
            timed_out: false,
        })
    }
}

/// Temporary project root with a gate config whose checks are plain shell.
pub struct TestProject {
    temp: TempDir,
}

impl TestProject {
    /// Project whose preferred checks all pass.
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir()?;
        let project = Self { temp };
        project.write_config(&passing_config())?;
        Ok(project)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn write_config(&self, cfg: &GateConfig) -> Result<()> {
        write_config(&self.path().join(".claude").join("stop_gate.toml"), cfg)
    }

    /// Write `{"stories": [...]}` to the default backlog path.
    pub fn write_backlog(&self, items: &[BacklogItem]) -> Result<()> {
        let dir = self.path().join("bmad");
        fs::create_dir_all(&dir)?;
        let doc = serde_json::json!({ "stories": items });
        fs::write(dir.join("backlog.json"), serde_json::to_string_pretty(&doc)?)?;
        Ok(())
    }

    pub fn state_path(&self) -> std::path::PathBuf {
        self.path().join(".claude").join(".autopilot_state.json")
    }

    pub fn flag_path(&self) -> std::path::PathBuf {
        self.path().join(".claude").join("HUMAN_NEEDED.md")
    }

    pub fn read_state(&self) -> Result<SessionState> {
        let raw = fs::read_to_string(self.state_path())?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_state(&self, state: &SessionState) -> Result<()> {
        fs::create_dir_all(self.path().join(".claude"))?;
        fs::write(self.state_path(), serde_json::to_string(state)?)?;
        Ok(())
    }
}

/// Config whose probe and preferred checks are `true`.
pub fn passing_config() -> GateConfig {
    let mut cfg = GateConfig::default();
    cfg.check_timeout_secs = 30;
    cfg.toolsets.probe = "true".to_string();
    cfg.toolsets.preferred = vec!["true".to_string(), "echo checked".to_string()];
    cfg.toolsets.fallback = vec!["false".to_string()];
    cfg
}
