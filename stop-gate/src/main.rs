//! Stop-gate hook binary.
//!
//! Reads the host's stop payload from stdin and prints a single
//! `{"decision": ..., "reason": ...}` line. The exit status only signals
//! whether a decision could be produced at all.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use stop_gate::exit_codes;
use stop_gate::gate::FileGate;
use stop_gate::io::backlog::FileBacklog;
use stop_gate::io::config::{DEFAULT_CONFIG_PATH, GateConfig, load_config, resolve, write_config};
use stop_gate::io::flag::FileFlag;
use stop_gate::io::hook::{read_input, write_decision};
use stop_gate::io::state_store::FileStateStore;
use stop_gate::logging;
use stop_gate::status::gate_status;

#[derive(Parser)]
#[command(
    name = "stop-gate",
    version,
    about = "Decide whether an agent session may stop"
)]
struct Cli {
    /// Project root; configured paths resolve against it.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file [default: <root>/.claude/stop_gate.toml].
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read the stop payload from stdin and print the decision (default).
    Hook,
    /// Write the default config file.
    Init {
        /// Overwrite an existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Show the stored counter, flag, and next backlog item for a session.
    Status {
        /// Session identifier as sent by the host.
        #[arg(long)]
        session: String,
    },
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| resolve(&cli.root, Path::new(DEFAULT_CONFIG_PATH)));
    match cli.command.unwrap_or(Command::Hook) {
        Command::Hook => cmd_hook(&cli.root, &config_path),
        Command::Init { force } => cmd_init(&config_path, force),
        Command::Status { session } => cmd_status(&cli.root, &config_path, &session),
    }
}

fn cmd_hook(root: &Path, config_path: &Path) -> Result<i32> {
    let input = read_input(io::stdin().lock())?;
    let cfg = load_config(config_path)?;
    let gate = FileGate::from_config(root, &cfg)?;
    let decision = gate.decide(input.session_id())?;
    write_decision(io::stdout().lock(), &decision)?;
    Ok(exit_codes::OK)
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    write_config(config_path, &GateConfig::default())?;
    println!("{}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_status(root: &Path, config_path: &Path, session: &str) -> Result<i32> {
    let cfg = load_config(config_path)?;
    let status = gate_status(
        session,
        cfg.max_blocks_per_session,
        &FileStateStore::new(resolve(root, &cfg.paths.state)),
        &FileBacklog::new(resolve(root, &cfg.paths.backlog)),
        &FileFlag::new(resolve(root, &cfg.paths.escalation_flag)),
    );
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_hook() {
        let cli = Cli::parse_from(["stop-gate"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["stop-gate", "init", "--force"]);
        assert!(matches!(cli.command, Some(Command::Init { force: true })));
    }

    #[test]
    fn parse_status_with_global_root() {
        let cli = Cli::parse_from(["stop-gate", "status", "--session", "abc", "--root", "/p"]);
        assert_eq!(cli.root, PathBuf::from("/p"));
        assert!(matches!(cli.command, Some(Command::Status { ref session }) if session == "abc"));
    }
}
