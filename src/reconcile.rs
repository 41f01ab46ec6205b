//! Role version reconciliation
//!
//! Compares the roles installed on the search path against the
//! requirements manifest. Every requirement gets exactly one
//! [`RoleOutcome`]; the [`ReconciliationReport`] then decides, under a
//! [`RolePolicy`], whether the deployment may proceed.
//!
//! Only reading the manifest or a role's install metadata can fail.
//! Missing, locally installed and wrong-version roles are data in the
//! report. Printing lives in [`crate::report`].

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::install_info::probe_installed_role;
use crate::requirements::{load_manifest, sort_by_name, RoleRequirement};
use crate::search_path::RoleSearchPath;
use crate::types::RolePolicy;

/// What was found for one requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RoleOutcome {
    /// No directory named after the role on the search path
    Missing,
    /// Installed by galaxy, but at a different version
    VersionMismatch {
        directory: PathBuf,
        installed_version: String,
    },
    /// Installed by galaxy at the required version
    Match { directory: PathBuf },
    /// Installed without galaxy metadata; version unknown
    LocallyInstalled { directory: PathBuf },
}

impl RoleOutcome {
    /// Whether this outcome fails the check under `policy`
    pub fn is_fatal(&self, policy: RolePolicy) -> bool {
        match self {
            Self::VersionMismatch { .. } => true,
            Self::Missing => policy.missing_fatal(),
            Self::LocallyInstalled { .. } => policy.local_fatal(),
            Self::Match { .. } => false,
        }
    }
}

/// One requirement together with its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleCheck {
    pub requirement: RoleRequirement,
    pub outcome: RoleOutcome,
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    /// Checks sorted by derived role name
    pub outcomes: Vec<RoleCheck>,
    pub overall_ok: bool,
    /// Install directories of roles at the wrong version
    pub mismatched_paths: Vec<PathBuf>,
    pub policy: RolePolicy,
}

impl ReconciliationReport {
    /// Derive `overall_ok` and `mismatched_paths` from classified checks
    pub fn from_checks(outcomes: Vec<RoleCheck>, policy: RolePolicy) -> Self {
        let overall_ok = !outcomes.iter().any(|c| c.outcome.is_fatal(policy));
        let mismatched_paths = outcomes
            .iter()
            .filter_map(|c| match &c.outcome {
                RoleOutcome::VersionMismatch { directory, .. } => Some(directory.clone()),
                _ => None,
            })
            .collect();
        Self {
            outcomes,
            overall_ok,
            mismatched_paths,
            policy,
        }
    }

    /// Requirements with no installed directory
    pub fn missing(&self) -> impl Iterator<Item = &RoleRequirement> {
        self.outcomes
            .iter()
            .filter(|c| c.outcome == RoleOutcome::Missing)
            .map(|c| &c.requirement)
    }

    /// True when missing roles should be installed: some are missing and
    /// nothing else is wrong.
    pub fn needs_install(&self) -> bool {
        self.overall_ok && self.missing().next().is_some()
    }
}

/// Classify one requirement against the filesystem.
pub fn check_requirement(
    requirement: &RoleRequirement,
    search_path: &RoleSearchPath,
) -> Result<RoleOutcome> {
    let Some(directory) = search_path.find_role(&requirement.name) else {
        return Ok(RoleOutcome::Missing);
    };

    let installed = probe_installed_role(&directory)?;
    let outcome = match installed.version {
        None => RoleOutcome::LocallyInstalled { directory },
        Some(version) if version == requirement.version => RoleOutcome::Match { directory },
        Some(installed_version) => RoleOutcome::VersionMismatch {
            directory,
            installed_version,
        },
    };
    Ok(outcome)
}

/// Reconcile `requirements` against the roles installed on `search_path`.
///
/// `strict` makes missing and locally installed roles fatal; otherwise
/// both are tolerated. See [`reconcile_with_policy`] for the in-between
/// policy the tasks use by default.
pub fn reconcile(
    requirements: &[RoleRequirement],
    search_path: &RoleSearchPath,
    strict: bool,
) -> Result<ReconciliationReport> {
    reconcile_with_policy(requirements, search_path, RolePolicy::from_strict(strict))
}

/// Reconcile under an explicit [`RolePolicy`].
///
/// Requirements are evaluated in derived-name order regardless of the
/// order given. Fails only if an install metadata file exists but cannot
/// be read.
pub fn reconcile_with_policy(
    requirements: &[RoleRequirement],
    search_path: &RoleSearchPath,
    policy: RolePolicy,
) -> Result<ReconciliationReport> {
    let mut sorted = requirements.to_vec();
    sort_by_name(&mut sorted);

    let outcomes = sorted
        .into_iter()
        .map(|requirement| {
            let outcome = check_requirement(&requirement, search_path)?;
            tracing::debug!(role = %requirement.name, outcome = ?outcome, "Checked role");
            Ok(RoleCheck {
                requirement,
                outcome,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let report = ReconciliationReport::from_checks(outcomes, policy);
    tracing::info!(
        roles = report.outcomes.len(),
        ok = report.overall_ok,
        mismatched = report.mismatched_paths.len(),
        policy = %policy,
        "Role version check finished"
    );
    Ok(report)
}

/// Read the manifest at `manifest` and reconcile it under `policy`.
pub fn check_manifest(
    manifest: &Path,
    search_path: &RoleSearchPath,
    policy: RolePolicy,
) -> Result<ReconciliationReport> {
    let requirements = load_manifest(manifest)?;
    reconcile_with_policy(&requirements, search_path, policy)
}
