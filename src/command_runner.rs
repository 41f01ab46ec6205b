//! Type-safe command execution
//!
//! [`run_command_safe`] is the only sanctioned way to spawn `ansible-*`
//! processes. It:
//!
//! - logs the exact argv and environment
//! - honors dry-run by printing the command instead of spawning it
//! - ties the child's lifetime to ours and registers its PID for cleanup
//!
//! Children inherit stdio so playbook output and password prompts reach
//! the operator directly.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::command_args::CommandArgs;
use crate::error::FabError;
use crate::process_guard::{ChildRegistry, CommandLifetime};

/// How commands are run for one `tfab` invocation
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Print commands instead of running them
    pub dry_run: bool,
    /// Working directory for the child; the current one if `None`
    pub cwd: Option<PathBuf>,
}

/// Outcome of one command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub command: String,
    /// Exit code (None if terminated by signal, or dry-run)
    pub exit_code: Option<i32>,
    pub success: bool,
    pub dry_run: bool,
}

impl CommandOutput {
    /// Turn an unsuccessful run into [`FabError::CommandFailed`].
    pub fn ensure_success(&self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(FabError::CommandFailed {
                command: self.command.clone(),
                exit_code: self.exit_code.unwrap_or(-1),
            }
            .into())
        }
    }
}

/// Execute a command with type-safe arguments.
///
/// Returns `Err` only if the process could not be spawned or waited on; a
/// non-zero exit is reported through [`CommandOutput::success`].
pub fn run_command_safe<T: CommandArgs>(args: &T, options: &RunOptions) -> Result<CommandOutput> {
    let command = args.display_command();
    let env_vars = args.get_env_vars();

    if options.dry_run {
        tracing::info!(command = %command, env = ?env_vars, "Dry run, not executing");
        println!("[DRY RUN] {}", command);
        return Ok(CommandOutput {
            command,
            exit_code: None,
            success: true,
            dry_run: true,
        });
    }

    tracing::info!(command = %command, env = ?env_vars, cwd = ?options.cwd, "Running command");

    let mut cmd = Command::new(args.program());
    cmd.args(args.to_cli_args())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .die_with_parent();
    if let Some(ref cwd) = options.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &env_vars {
        cmd.env(key, value);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn: {}", command))?;
    let pid = child.id();

    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.register(pid);
    }

    let status = child.wait();

    if let Ok(mut registry) = ChildRegistry::global().lock() {
        registry.unregister(pid);
    }

    let status = status.with_context(|| format!("Failed waiting for: {}", command))?;
    let exit_code = status.code();
    tracing::info!(command = %command, exit_code = ?exit_code, "Command finished");

    Ok(CommandOutput {
        command,
        exit_code,
        success: status.success(),
        dry_run: false,
    })
}
