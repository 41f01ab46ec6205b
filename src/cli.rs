use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::types::{OutputFormat, RolePolicy};

/// tequila-fab - deployment tasks wrapping ansible-playbook and ansible-galaxy
#[derive(Parser, Debug)]
#[command(name = "tfab")]
#[command(about = "Deployment tasks wrapping ansible-playbook and ansible-galaxy")]
#[command(version)]
pub struct Cli {
    /// Target environment (inventory under deployment/environments/)
    #[arg(long = "env", global = true, env = "TFAB_ENV", value_name = "ENV")]
    pub environment: Option<String>,

    /// Dev mode: roles installed without ansible-galaxy are only warnings
    #[arg(long, global = true, conflicts_with = "strict")]
    pub dev: bool,

    /// Strict mode: missing roles are fatal instead of being installed
    #[arg(long, global = true)]
    pub strict: bool,

    /// Print the ansible commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Project directory containing deployment/ (default: current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install roles, then run the bootstrap_python and site playbooks
    Bootstrap,
    /// Verify installed roles match deployment/requirements.yml
    CheckRoleVersions {
        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Create a superuser with the create_superuser playbook
    CreateSuperuser {
        /// Email address of the new superuser
        email: String,
    },
    /// Run a playbook against the selected environment
    Deploy {
        /// Playbook name under deployment/playbooks/ (default: site)
        play: Option<String>,
        /// Passed to ansible-playbook as --extra-vars
        #[arg(long, value_name = "VARS")]
        extra_vars: Option<String>,
        /// Sets the repo_branch variable
        #[arg(long)]
        branch: Option<String>,
        /// Limit the run to matching hosts
        #[arg(short = 'l', long)]
        limit: Option<String>,
        /// Ansible verbosity, 1-4 (-v through -vvvv)
        #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(1..=4))]
        ansible_verbosity: Option<u8>,
    },
    /// Install the roles listed in deployment/requirements.yml
    InstallRoles,
    /// Redeploy the web servers with a fresh virtualenv
    RecreateVenv,
    /// Show the Ansible config file and role search path in use
    RolesPath,
}

impl Commands {
    /// Whether the command spawns ansible-playbook
    pub fn runs_playbooks(&self) -> bool {
        matches!(
            self,
            Self::Bootstrap
                | Self::CreateSuperuser { .. }
                | Self::Deploy { .. }
                | Self::RecreateVenv
        )
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    pub fn policy(&self) -> RolePolicy {
        match (self.dev, self.strict) {
            (true, _) => RolePolicy::Dev,
            (_, true) => RolePolicy::Strict,
            _ => RolePolicy::Standard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["tfab"]).is_err());
    }

    #[test]
    fn test_cli_check_role_versions_defaults() {
        let cli = Cli::try_parse_from(["tfab", "check-role-versions"]).unwrap();
        assert_eq!(cli.policy(), RolePolicy::Standard);
        match cli.command {
            Commands::CheckRoleVersions { format } => assert_eq!(format, OutputFormat::Text),
            _ => panic!("Expected CheckRoleVersions command"),
        }
    }

    #[test]
    fn test_cli_dev_flag_before_task() {
        let cli = Cli::try_parse_from(["tfab", "--dev", "check-role-versions"]).unwrap();
        assert_eq!(cli.policy(), RolePolicy::Dev);
    }

    #[test]
    fn test_cli_strict_flag_selects_strict_policy() {
        let cli = Cli::try_parse_from(["tfab", "check-role-versions", "--strict"]).unwrap();
        assert_eq!(cli.policy(), RolePolicy::Strict);
    }

    #[test]
    fn test_cli_dev_and_strict_conflict() {
        assert!(Cli::try_parse_from(["tfab", "--dev", "--strict", "install-roles"]).is_err());
    }

    #[test]
    fn test_cli_deploy_options() {
        let cli = Cli::try_parse_from([
            "tfab",
            "--env",
            "staging",
            "deploy",
            "web",
            "--extra-vars",
            "aaa=1 bbb=2",
            "--branch",
            "develop",
            "-l",
            "web1",
            "--ansible-verbosity",
            "2",
        ])
        .unwrap();
        assert_eq!(cli.environment.as_deref(), Some("staging"));
        match cli.command {
            Commands::Deploy {
                play,
                extra_vars,
                branch,
                limit,
                ansible_verbosity,
            } => {
                assert_eq!(play.as_deref(), Some("web"));
                assert_eq!(extra_vars.as_deref(), Some("aaa=1 bbb=2"));
                assert_eq!(branch.as_deref(), Some("develop"));
                assert_eq!(limit.as_deref(), Some("web1"));
                assert_eq!(ansible_verbosity, Some(2));
            }
            _ => panic!("Expected Deploy command"),
        }
    }

    #[test]
    fn test_cli_ansible_verbosity_range() {
        assert!(Cli::try_parse_from(["tfab", "deploy", "--ansible-verbosity", "5"]).is_err());
    }

    #[test]
    fn test_cli_create_superuser_requires_email() {
        assert!(Cli::try_parse_from(["tfab", "create-superuser"]).is_err());
        let cli = Cli::try_parse_from(["tfab", "create-superuser", "admin@example.com"]).unwrap();
        assert!(cli.command.runs_playbooks());
    }

    #[test]
    fn test_cli_json_format() {
        let cli = Cli::try_parse_from(["tfab", "check-role-versions", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::CheckRoleVersions {
                format: OutputFormat::Json
            }
        ));
        assert!(!cli.command.runs_playbooks());
    }
}
