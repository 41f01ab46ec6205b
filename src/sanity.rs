//! Pre-flight sanity checks
//!
//! Verifies the Ansible command-line tools a task needs are on `PATH`
//! before anything runs, so a deploy doesn't half-start and then die with
//! "No such file or directory".

use std::io::Write;
use std::process::Command;

/// Result of environment verification
#[derive(Debug, Default)]
pub struct SanityCheckResult {
    pub missing_binaries: Vec<String>,
}

impl SanityCheckResult {
    pub fn is_ok(&self) -> bool {
        self.missing_binaries.is_empty()
    }
}

/// Binaries every playbook task needs
pub const PLAYBOOK_BINARIES: &[&str] = &["ansible-playbook", "ansible-galaxy"];

/// Binaries the role installer needs
pub const GALAXY_BINARIES: &[&str] = &["ansible-galaxy"];

/// Check if a binary is available in PATH
fn binary_exists(name: &str) -> bool {
    Command::new("sh")
        .args(["-c", "command -v \"$1\"", "sh", name])
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Check that each of `binaries` can be found.
pub fn verify_environment(binaries: &[&str]) -> SanityCheckResult {
    let missing_binaries = binaries
        .iter()
        .filter(|binary| !binary_exists(binary))
        .map(|binary| binary.to_string())
        .collect();
    SanityCheckResult { missing_binaries }
}

/// How to get a missing binary
fn install_hint(binary: &str) -> &'static str {
    match binary {
        "ansible-playbook" | "ansible-galaxy" => "pip install ansible-core",
        _ => "see your package manager",
    }
}

/// Write a formatted pre-flight failure message.
pub fn print_preflight_failure(result: &SanityCheckResult, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "tfab: pre-flight check failed")?;
    writeln!(out)?;
    writeln!(out, "  Missing required binaries:")?;
    for binary in &result.missing_binaries {
        writeln!(out, "    - {} (install: {})", binary, install_hint(binary))?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "  Activate the virtualenv that provides Ansible, or install it, then try again."
    )?;
    writeln!(out)?;
    Ok(())
}

/// Verify `binaries`, logging the outcome.
pub fn run_preflight_checks(binaries: &[&str]) -> SanityCheckResult {
    tracing::debug!(?binaries, "Running pre-flight sanity checks");
    let result = verify_environment(binaries);
    if result.is_ok() {
        tracing::info!("Pre-flight checks passed");
    } else {
        tracing::warn!(missing = ?result.missing_binaries, "Pre-flight checks failed");
    }
    result
}
