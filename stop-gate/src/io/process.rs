//! Helpers for running check commands with timeouts and bounded output.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child process output. Only the tail of each stream is kept.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

/// Build a command that runs `line` through the platform shell.
pub fn shell_command(line: &str) -> Command {
    let (shell, flag) = if cfg!(windows) {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };
    let mut cmd = Command::new(shell);
    cmd.arg(flag).arg(line);
    cmd
}

/// Run a command with a timeout and capture the tail of stdout/stderr.
///
/// Output is drained concurrently while the child runs so a chatty tool can
/// never block on a full pipe. At most `tail_limit_bytes` of each stream is
/// retained; earlier bytes are discarded and counted.
///
/// On Unix the child leads its own process group and a timeout kills the
/// whole group, so tools it spawned cannot hold the pipes open.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), tail_limit_bytes))]
pub fn run_command_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    tail_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    own_process_group(&mut cmd);

    debug!("spawning child process");
    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            error!(err = %e, "failed to spawn command");
            return Err(e).context("spawn command");
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || read_stream_tail(stdout, tail_limit_bytes));
    let stderr_handle = thread::spawn(move || read_stream_tail(stderr, tail_limit_bytes));

    let mut timed_out = false;
    let status = match child.wait_timeout(timeout).context("wait for command")? {
        Some(status) => status,
        None => {
            warn!(
                timeout_secs = timeout.as_secs(),
                "command timed out, killing"
            );
            timed_out = true;
            kill_process_tree(&mut child)?;
            child.wait().context("wait command after kill")?
        }
    };

    let (stdout, stdout_dropped) = join_output(stdout_handle).context("join stdout")?;
    let (stderr, stderr_dropped) = join_output(stderr_handle).context("join stderr")?;

    if stdout_dropped > 0 || stderr_dropped > 0 {
        debug!(stdout_dropped, stderr_dropped, "output head discarded");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

#[cfg(unix)]
fn own_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_cmd: &mut Command) {}

/// Kill `child` and, on Unix, every process in its group.
fn kill_process_tree(child: &mut Child) -> Result<()> {
    if cfg!(unix) {
        let group = format!("-{}", child.id());
        match Command::new("kill")
            .args(["-s", "KILL", "--", group.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => {
                warn!(exit_code = ?status.code(), "group kill failed, killing child only");
            }
            Err(e) => warn!(err = %e, "group kill unavailable, killing child only"),
        }
    }
    child.kill().context("kill command")
}

fn join_output(handle: thread::JoinHandle<Result<(Vec<u8>, usize)>>) -> Result<(Vec<u8>, usize)> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}

/// Drain `reader`, keeping only the last `limit` bytes.
///
/// Returns the retained tail and the number of leading bytes discarded.
fn read_stream_tail<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut dropped = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > limit {
            let excess = buf.len() - limit;
            buf.drain(..excess);
            dropped += excess;
        }
    }

    Ok((buf, dropped))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn tail_reader_keeps_last_bytes() {
        let input = b"0123456789".repeat(2000);
        let (tail, dropped) = read_stream_tail(&input[..], 15).expect("read");
        assert_eq!(tail, b"567890123456789".to_vec());
        assert_eq!(dropped, input.len() - 15);
    }

    #[test]
    fn tail_reader_keeps_short_streams_whole() {
        let (tail, dropped) = read_stream_tail(&b"short"[..], 100).expect("read");
        assert_eq!(tail, b"short".to_vec());
        assert_eq!(dropped, 0);
    }

    #[cfg(unix)]
    #[test]
    fn captures_exit_status_and_streams() {
        let output = run_command_with_timeout(
            shell_command("echo out; echo err >&2; exit 3"),
            Duration::from_secs(10),
            1024,
        )
        .expect("run");
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(String::from_utf8_lossy(&output.stdout), "out\n");
        assert_eq!(String::from_utf8_lossy(&output.stderr), "err\n");
        assert!(!output.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn kills_commands_that_exceed_timeout() {
        let output = run_command_with_timeout(
            shell_command("exec sleep 30"),
            Duration::from_millis(200),
            1024,
        )
        .expect("run");
        assert!(output.timed_out);
        assert!(!output.status.success());
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_grandchildren_holding_the_pipes() {
        let started = Instant::now();
        let output = run_command_with_timeout(
            shell_command("sleep 30; true"),
            Duration::from_millis(300),
            1024,
        )
        .expect("run");
        assert!(output.timed_out);
        assert!(
            started.elapsed() < Duration::from_secs(10),
            "waited {:?}",
            started.elapsed()
        );
    }
}
