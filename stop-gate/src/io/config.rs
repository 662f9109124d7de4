//! Gate configuration stored under `.claude/stop_gate.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::policy::DEFAULT_MAX_BLOCKS_PER_SESSION;
use crate::core::report::{DEFAULT_INSTRUCTION, DEFAULT_REPORT_TAIL_CHARS, InstructionTemplate};
use crate::core::toolset::Toolset;
use crate::io::atomic::write_atomic;
use crate::io::checks::DEFAULT_CHECK_TIMEOUT;

/// Default config location relative to the project root.
pub const DEFAULT_CONFIG_PATH: &str = ".claude/stop_gate.toml";

/// Gate configuration (TOML).
///
/// Edited by humans. Every field is optional and missing fields take the
/// defaults the hook has always shipped with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GateConfig {
    /// Backlog-driven blocks allowed per session before escalating.
    pub max_blocks_per_session: u32,

    /// Wall-clock limit for each check command, in seconds.
    pub check_timeout_secs: u64,

    /// Characters of stdout/stderr quoted when a check fails.
    pub report_tail_chars: usize,

    pub paths: PathsConfig,
    pub toolsets: ToolsetsConfig,
    pub backlog: BacklogConfig,
}

/// Project-relative artifact locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub state: PathBuf,
    pub backlog: PathBuf,
    pub escalation_flag: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsetsConfig {
    /// Exits zero when the preferred tool runner is installed.
    pub probe: String,
    pub preferred: Vec<String>,
    pub fallback: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BacklogConfig {
    /// minijinja template; receives `id`, `title` and `backlog_path`.
    pub instruction: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_blocks_per_session: DEFAULT_MAX_BLOCKS_PER_SESSION,
            check_timeout_secs: DEFAULT_CHECK_TIMEOUT.as_secs(),
            report_tail_chars: DEFAULT_REPORT_TAIL_CHARS,
            paths: PathsConfig::default(),
            toolsets: ToolsetsConfig::default(),
            backlog: BacklogConfig::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: PathBuf::from(".claude/.autopilot_state.json"),
            backlog: PathBuf::from("bmad/backlog.json"),
            escalation_flag: PathBuf::from(".claude/HUMAN_NEEDED.md"),
        }
    }
}

impl Default for ToolsetsConfig {
    fn default() -> Self {
        Self {
            probe: "command -v pnpm".to_string(),
            preferred: vec![
                "pnpm -s lint".to_string(),
                "pnpm -s test -- --run".to_string(),
                "pnpm -s typecheck".to_string(),
            ],
            fallback: vec![
                "npm run lint".to_string(),
                "npm test".to_string(),
                "npm run typecheck".to_string(),
            ],
        }
    }
}

impl Default for BacklogConfig {
    fn default() -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

impl ToolsetsConfig {
    pub fn commands(&self, toolset: Toolset) -> &[String] {
        match toolset {
            Toolset::Preferred => &self.preferred,
            Toolset::Fallback => &self.fallback,
        }
    }
}

impl GateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.check_timeout_secs == 0 {
            return Err(anyhow!("check_timeout_secs must be > 0"));
        }
        if self.report_tail_chars == 0 {
            return Err(anyhow!("report_tail_chars must be > 0"));
        }
        if self.toolsets.probe.trim().is_empty() {
            return Err(anyhow!("toolsets.probe must be a non-empty command"));
        }
        for (name, commands) in [
            ("toolsets.preferred", &self.toolsets.preferred),
            ("toolsets.fallback", &self.toolsets.fallback),
        ] {
            if commands.is_empty() || commands.iter().any(|c| c.trim().is_empty()) {
                return Err(anyhow!("{name} must be a non-empty array of commands"));
            }
        }
        for (name, path) in [
            ("paths.state", &self.paths.state),
            ("paths.backlog", &self.paths.backlog),
            ("paths.escalation_flag", &self.paths.escalation_flag),
        ] {
            if path.as_os_str().is_empty() {
                return Err(anyhow!("{name} must not be empty"));
            }
        }
        self.instruction_template()?;
        Ok(())
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn instruction_template(&self) -> Result<InstructionTemplate> {
        InstructionTemplate::new(self.backlog.instruction.clone())
            .context("backlog.instruction is not a valid template")
    }
}

/// Resolve a configured path against the project root (absolute paths win).
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    root.join(path)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GateConfig::default()`.
pub fn load_config(path: &Path) -> Result<GateConfig> {
    if !path.exists() {
        let cfg = GateConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GateConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &GateConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
