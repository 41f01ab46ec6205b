//! Deployment tasks.
//!
//! Every task that runs a playbook checks installed role versions first,
//! so a deployment never runs against roles that drifted from
//! `deployment/requirements.yml`.

pub mod galaxy;
pub mod playbook;

use anyhow::Result;
use serde_json::json;
use std::io::Write;

use crate::command_runner::run_command_safe;
use crate::context::FabContext;
use crate::error::FabError;
use crate::reconcile::{check_manifest, ReconciliationReport};
use crate::report;
use crate::requirements::REQUIREMENTS_FILE;
use crate::types::OutputFormat;

use galaxy::GalaxyInstallArgs;
use playbook::{ExtraVars, PlaybookArgs, DEFAULT_PLAYBOOK};

/// Options of the `deploy` task
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Playbook name under `deployment/playbooks/`; `site` if `None`
    pub play: Option<String>,
    pub extra_vars: Option<ExtraVars>,
    pub branch: Option<String>,
    pub limit: Option<String>,
    pub verbosity: Option<u8>,
}

impl DeployOptions {
    pub fn play(play: &str) -> Self {
        Self {
            play: Some(play.to_string()),
            ..Self::default()
        }
    }

    pub fn with_extra_vars(mut self, vars: ExtraVars) -> Self {
        self.extra_vars = Some(vars);
        self
    }
}

/// Install the roles listed in the requirements manifest.
pub fn install_roles(ctx: &FabContext) -> Result<()> {
    let args = GalaxyInstallArgs::new(REQUIREMENTS_FILE);
    run_command_safe(&args, &ctx.run)?.ensure_success()
}

/// Check installed roles against the manifest and print the report.
///
/// When roles are missing but nothing else is wrong, installs them; under
/// [`RolePolicy::Strict`](crate::types::RolePolicy::Strict) missing roles
/// fail instead. Fails with [`FabError::RequirementsUnsatisfied`] when the
/// report is not ok.
pub fn check_role_versions(ctx: &FabContext, out: &mut dyn Write) -> Result<ReconciliationReport> {
    tracing::debug!(
        policy = %ctx.policy,
        format = %ctx.report_format,
        "Checking role versions"
    );
    let report = check_manifest(&ctx.requirements_file(), &ctx.search_path, ctx.policy)?;

    match ctx.report_format {
        OutputFormat::Text => report::write_text(&report, &mut *out, ctx.color)?,
        OutputFormat::Json => report::write_json(&report, &mut *out)?,
    }
    out.flush()?;

    if report.needs_install() {
        tracing::info!(
            missing = report.missing().count(),
            "Installing missing roles"
        );
        install_roles(ctx)?;
    }

    if !report.overall_ok {
        return Err(FabError::RequirementsUnsatisfied {
            mismatched: report.mismatched_paths.len(),
        }
        .into());
    }

    Ok(report)
}

/// Run a playbook against the selected environment.
pub fn deploy(ctx: &FabContext, options: &DeployOptions, out: &mut dyn Write) -> Result<()> {
    let env = ctx.require_environment()?;
    check_role_versions(ctx, out)?;

    let play = options.play.as_deref().unwrap_or(DEFAULT_PLAYBOOK);
    let mut args = PlaybookArgs::new(env, play, ctx.project_dir());
    args.extra_vars = options.extra_vars.clone();
    args.branch = options.branch.clone();
    args.limit = options.limit.clone();
    args.verbosity = options.verbosity;

    run_command_safe(&args, &ctx.run)?.ensure_success()
}

/// Prepare fresh servers: install roles, then run the `bootstrap_python`
/// and `site` playbooks.
pub fn bootstrap(ctx: &FabContext, out: &mut dyn Write) -> Result<()> {
    ctx.require_environment()?;
    install_roles(ctx)?;
    check_role_versions(ctx, out)?;
    deploy(ctx, &DeployOptions::play("bootstrap_python"), out)?;
    deploy(
        ctx,
        &DeployOptions::play(DEFAULT_PLAYBOOK)
            .with_extra_vars(ExtraVars::Json(json!({"unmanaged_users": ["ubuntu"]}))),
        out,
    )
}

/// Create a Django superuser through the `create_superuser` playbook.
pub fn create_superuser(ctx: &FabContext, email: &str, out: &mut dyn Write) -> Result<()> {
    deploy(
        ctx,
        &DeployOptions::play("create_superuser")
            .with_extra_vars(ExtraVars::Json(json!({"EMAIL": email}))),
        out,
    )?;

    let reminder = "YOU SHOULD NOW DO A PASSWORD RESET";
    if ctx.color {
        use crossterm::style::Stylize;
        writeln!(out, "{}", reminder.red())?;
    } else {
        writeln!(out, "{}", reminder)?;
    }
    Ok(())
}

/// Redeploy the web servers with a freshly created virtualenv.
pub fn recreate_venv(ctx: &FabContext, out: &mut dyn Write) -> Result<()> {
    deploy(
        ctx,
        &DeployOptions::play("web")
            .with_extra_vars(ExtraVars::Json(json!({"force_recreate_venv": true}))),
        out,
    )
}
