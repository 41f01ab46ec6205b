//! Human-readable and JSON rendering of a [`ReconciliationReport`].
//!
//! Lines are built as data first ([`ReportLine`]) so the wording can be
//! tested without a terminal; colors are applied only when writing.

use crossterm::style::{Color, Stylize};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::reconcile::{ReconciliationReport, RoleCheck, RoleOutcome};
use crate::types::RolePolicy;

/// Severity of a report line, which also picks its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Warning,
    Error,
    Plain,
}

impl Severity {
    fn color(self) -> Option<Color> {
        match self {
            Self::Good => Some(Color::Green),
            Self::Warning => Some(Color::Yellow),
            Self::Error => Some(Color::Red),
            Self::Plain => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub severity: Severity,
    pub text: String,
}

impl ReportLine {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

fn check_lines(check: &RoleCheck, policy: RolePolicy) -> Vec<ReportLine> {
    let name = &check.requirement.name;
    let required = &check.requirement.version;
    match &check.outcome {
        RoleOutcome::Missing if policy.missing_fatal() => vec![ReportLine::new(
            Severity::Error,
            format!("ERROR: role {} not installed", name),
        )],
        RoleOutcome::Missing => vec![ReportLine::new(
            Severity::Warning,
            format!("WARNING: role {} not installed", name),
        )],
        RoleOutcome::VersionMismatch {
            directory,
            installed_version,
        } => vec![ReportLine::new(
            Severity::Error,
            format!(
                "ERROR: role {} at {} is version {}, should be version {}",
                name,
                directory.display(),
                installed_version,
                required
            ),
        )],
        RoleOutcome::Match { directory } => vec![ReportLine::new(
            Severity::Good,
            format!("GOOD:  role {} {} at {}", name, required, directory.display()),
        )],
        RoleOutcome::LocallyInstalled { directory } if policy.local_fatal() => vec![
            ReportLine::new(
                Severity::Error,
                format!(
                    "ERROR:  role {} at {} appears to have been locally installed, will not continue",
                    name,
                    directory.display()
                ),
            ),
            ReportLine::new(
                Severity::Error,
                "To ignore this error, pass --dev before the task name",
            ),
        ],
        RoleOutcome::LocallyInstalled { directory } => vec![ReportLine::new(
            Severity::Warning,
            format!(
                "SKIP:  role {} at {} appears to have been locally installed",
                name,
                directory.display()
            ),
        )],
    }
}

/// Quote a path for a POSIX shell when it contains anything unusual.
fn shell_quote(path: &Path) -> String {
    let text = path.display().to_string();
    let safe = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:@%".contains(c));
    if safe {
        text
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}

/// Copy-pasteable command removing the given role directories
pub fn removal_command(paths: &[PathBuf]) -> String {
    let quoted: Vec<String> = paths.iter().map(|p| shell_quote(p)).collect();
    format!("$ rm -r {}", quoted.join(" "))
}

/// Closing lines printed when the check fails
pub fn remediation_lines(report: &ReconciliationReport) -> Vec<ReportLine> {
    if report.overall_ok {
        return Vec::new();
    }
    let mut lines = vec![ReportLine::new(
        Severity::Error,
        "Ansible galaxy role requirements are not satisfied, quitting.  The simplest fix is to \
         delete the roles that have wrong versions, then run `tfab install-roles` again.",
    )];
    if !report.mismatched_paths.is_empty() {
        lines.push(ReportLine::new(Severity::Plain, "E.g."));
        lines.push(ReportLine::new(
            Severity::Plain,
            removal_command(&report.mismatched_paths),
        ));
    }
    lines
}

/// Every line of the text report, in order
pub fn render_lines(report: &ReconciliationReport) -> Vec<ReportLine> {
    let mut lines: Vec<ReportLine> = report
        .outcomes
        .iter()
        .flat_map(|check| check_lines(check, report.policy))
        .collect();
    lines.extend(remediation_lines(report));
    lines
}

/// Write the text report, colored when `color` is set.
pub fn write_text(
    report: &ReconciliationReport,
    out: &mut (impl Write + ?Sized),
    color: bool,
) -> Result<()> {
    for line in render_lines(report) {
        match line.severity.color() {
            Some(c) if color => writeln!(out, "{}", line.text.with(c))?,
            _ => writeln!(out, "{}", line.text)?,
        }
    }
    Ok(())
}

/// Write the report as pretty JSON.
pub fn write_json(report: &ReconciliationReport, out: &mut (impl Write + ?Sized)) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}
