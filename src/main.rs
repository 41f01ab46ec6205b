//! tfab - main entry point

use anyhow::{Context, Result};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use tequila_fab::ansible_config::{AnsibleConfig, ConfigEnv};
use tequila_fab::cli::{Cli, Commands};
use tequila_fab::context::FabContext;
use tequila_fab::tasks::playbook::ExtraVars;
use tequila_fab::tasks::{self, DeployOptions};
use tequila_fab::{process_guard, sanity};

/// Initialize logging on stderr; stdout carries the role report.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn use_color(cli: &Cli) -> bool {
    !cli.no_color && std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

fn build_context(cli: &Cli, color: bool) -> Result<FabContext> {
    let project_dir = match cli.project_dir {
        Some(ref dir) => dir.clone(),
        None => PathBuf::from("."),
    };
    let project_dir = project_dir
        .canonicalize()
        .with_context(|| format!("Project directory {:?} not found", project_dir))?;

    let mut env = ConfigEnv::from_process()?;
    env.cwd = project_dir.clone();
    let ansible = AnsibleConfig::discover(&env)?;

    let mut ctx = FabContext::new(project_dir, ansible.roles_path)
        .with_environment(cli.environment.clone())
        .with_policy(cli.policy())
        .with_dry_run(cli.dry_run)
        .with_color(color);
    if let Commands::CheckRoleVersions { format } = cli.command {
        ctx = ctx.with_report_format(format);
    }
    Ok(ctx)
}

fn preflight(cli: &Cli) -> bool {
    if cli.dry_run {
        return true;
    }
    let binaries = match cli.command {
        ref cmd if cmd.runs_playbooks() => sanity::PLAYBOOK_BINARIES,
        Commands::InstallRoles => sanity::GALAXY_BINARIES,
        // check-role-versions only needs ansible-galaxy when a role is
        // missing, which is not known yet
        _ => return true,
    };
    let result = sanity::run_preflight_checks(binaries);
    if !result.is_ok() {
        let _ = sanity::print_preflight_failure(&result, &mut std::io::stderr());
    }
    result.is_ok()
}

fn run(cli: &Cli) -> Result<()> {
    let color = use_color(cli);

    if let Commands::RolesPath = cli.command {
        let mut env = ConfigEnv::from_process()?;
        if let Some(ref dir) = cli.project_dir {
            env.cwd = dir.clone();
        }
        let ansible = AnsibleConfig::discover(&env)?;
        let mut out = std::io::stdout().lock();
        match ansible.config_file {
            Some(ref path) => writeln!(out, "config file: {}", path.display())?,
            None => writeln!(out, "config file: (none, using defaults)")?,
        }
        for dir in ansible.roles_path.dirs() {
            writeln!(out, "  {}", dir.display())?;
        }
        return Ok(());
    }

    let ctx = build_context(cli, color)?;
    tracing::debug!(?ctx, "Task context ready");
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Bootstrap => tasks::bootstrap(&ctx, &mut out),
        Commands::CheckRoleVersions { .. } => tasks::check_role_versions(&ctx, &mut out).map(|_| ()),
        Commands::CreateSuperuser { ref email } => tasks::create_superuser(&ctx, email, &mut out),
        Commands::Deploy {
            ref play,
            ref extra_vars,
            ref branch,
            ref limit,
            ansible_verbosity,
        } => {
            let options = DeployOptions {
                play: play.clone(),
                extra_vars: extra_vars.clone().map(ExtraVars::Raw),
                branch: branch.clone(),
                limit: limit.clone(),
                verbosity: ansible_verbosity,
            };
            tasks::deploy(&ctx, &options, &mut out)
        }
        Commands::InstallRoles => tasks::install_roles(&ctx),
        Commands::RecreateVenv => tasks::recreate_venv(&ctx, &mut out),
        Commands::RolesPath => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);
    tracing::debug!(?cli, "CLI arguments parsed");

    if let Err(e) = process_guard::init_signal_handlers() {
        tracing::warn!(error = %e, "Failed to initialize signal handlers");
    }

    if !preflight(&cli) {
        std::process::exit(1);
    }

    if let Err(e) = run(&cli) {
        tracing::error!(error = %e, "Task failed");
        eprintln!("tfab: {:#}", e);
        std::process::exit(1);
    }
}
