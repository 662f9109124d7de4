//! Check runner adapter: executes the configured quality gates in order.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::core::types::CheckResult;
use crate::io::process::{run_command_with_timeout, shell_command};

pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Executes a single shell-invocable command line.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<CheckResult>;
}

/// Runs commands through the platform shell inside the project root.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    pub workdir: PathBuf,
    pub timeout: Duration,
    /// Bytes of each stream kept in memory (the report is cut further, by chars).
    pub tail_limit_bytes: usize,
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CheckResult> {
        let mut cmd = shell_command(command);
        cmd.current_dir(&self.workdir);
        let output = run_command_with_timeout(cmd, self.timeout, self.tail_limit_bytes)?;
        let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if output.timed_out {
            stderr.push_str(&format!("\n[killed after {:?} timeout]\n", self.timeout));
        }
        Ok(CheckResult {
            command: command.to_string(),
            exit_status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr,
            timed_out: output.timed_out,
        })
    }
}

/// Run `commands` strictly in order and return the first failure.
///
/// Returns `None` when every command passed. A command that cannot be started
/// is reported as a failed check rather than an error, so the gate always has
/// a decision to emit.
pub fn run_checks<R: CommandRunner>(runner: &R, commands: &[String]) -> Option<CheckResult> {
    for command in commands {
        debug!(command = %command, "running check");
        let result = match runner.run(command) {
            Ok(result) => result,
            Err(err) => {
                warn!(command = %command, err = %format!("{err:#}"), "check could not run");
                CheckResult {
                    command: command.clone(),
                    exit_status: None,
                    stdout: String::new(),
                    stderr: format!("failed to run check: {err:#}"),
                    timed_out: false,
                }
            }
        };
        if !result.passed() {
            info!(command = %command, exit_status = ?result.exit_status, "check failed");
            return Some(result);
        }
    }
    None
}

/// Availability probe for the preferred toolset. Any error counts as unavailable.
pub fn probe_available<R: CommandRunner>(runner: &R, probe: &str) -> bool {
    match runner.run(probe) {
        Ok(result) => result.passed(),
        Err(err) => {
            debug!(probe = %probe, err = %format!("{err:#}"), "probe failed to run");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::anyhow;

    use super::*;

    /// Fails any command listed in `failing`; errors on any listed in `broken`.
    struct FakeRunner {
        failing: Vec<&'static str>,
        broken: Vec<&'static str>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn new(failing: Vec<&'static str>, broken: Vec<&'static str>) -> Self {
            Self {
                failing,
                broken,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &str) -> Result<CheckResult> {
            self.seen.borrow_mut().push(command.to_string());
            if self.broken.iter().any(|c| *c == command) {
                return Err(anyhow!("no such shell"));
            }
            let code = if self.failing.iter().any(|c| *c == command) {
                1
            } else {
                0
            };
            Ok(CheckResult {
                command: command.to_string(),
                exit_status: Some(code),
                stdout: String::new(),
                stderr: String::new(),
                timed_out: false,
            })
        }
    }

    fn commands() -> Vec<String> {
        vec!["lint".to_string(), "test".to_string(), "typecheck".to_string()]
    }

    #[test]
    fn all_passing_returns_none() {
        let runner = FakeRunner::new(vec![], vec![]);
        assert!(run_checks(&runner, &commands()).is_none());
        assert_eq!(*runner.seen.borrow(), commands());
    }

    #[test]
    fn stops_at_first_failure() {
        let runner = FakeRunner::new(vec!["test", "typecheck"], vec![]);
        let failed = run_checks(&runner, &commands()).expect("failure");
        assert_eq!(failed.command, "test");
        assert_eq!(*runner.seen.borrow(), vec!["lint", "test"]);
    }

    #[test]
    fn runner_errors_become_failed_checks() {
        let runner = FakeRunner::new(vec![], vec!["lint"]);
        let failed = run_checks(&runner, &commands()).expect("failure");
        assert_eq!(failed.command, "lint");
        assert_eq!(failed.exit_status, None);
        assert!(failed.stderr.contains("no such shell"));
    }

    #[test]
    fn probe_reports_availability() {
        let runner = FakeRunner::new(vec!["missing"], vec!["broken"]);
        assert!(probe_available(&runner, "present"));
        assert!(!probe_available(&runner, "missing"));
        assert!(!probe_available(&runner, "broken"));
    }

    #[cfg(unix)]
    #[test]
    fn shell_runner_runs_in_workdir() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join("marker.txt"), "here").expect("write marker");
        let runner = ShellRunner {
            workdir: temp.path().to_path_buf(),
            timeout: Duration::from_secs(10),
            tail_limit_bytes: 1024,
        };
        let result = runner.run("cat marker.txt").expect("run");
        assert!(result.passed());
        assert_eq!(result.stdout, "here");
    }

    #[cfg(unix)]
    #[test]
    fn shell_runner_reports_timeouts_as_failures() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = ShellRunner {
            workdir: temp.path().to_path_buf(),
            timeout: Duration::from_millis(200),
            tail_limit_bytes: 1024,
        };
        let started = std::time::Instant::now();
        let failed = run_checks(&runner, &["sleep 30; true".to_string()]).expect("failure");
        assert!(failed.timed_out);
        assert!(failed.stderr.contains("timeout"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
