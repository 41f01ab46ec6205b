//! tequila-fab library
//!
//! Deployment tasks around `ansible-playbook` and `ansible-galaxy`, and
//! the role version check that guards them.

pub mod ansible_config;
pub mod cli;
pub mod command_args;
pub mod command_runner;
pub mod context;
pub mod error;
pub mod install_info;
pub mod process_guard;
pub mod reconcile;
pub mod report;
pub mod requirements;
pub mod sanity;
pub mod search_path;
pub mod tasks;
pub mod types;

pub use ansible_config::{AnsibleConfig, ConfigEnv};
pub use command_args::CommandArgs;
pub use command_runner::{run_command_safe, CommandOutput, RunOptions};
pub use context::FabContext;
pub use error::FabError;
pub use install_info::{InstallInfo, InstalledRoleInfo};
pub use reconcile::{
    check_manifest, reconcile, reconcile_with_policy, ReconciliationReport, RoleCheck, RoleOutcome,
};
pub use requirements::{load_manifest, RoleRequirement};
pub use search_path::RoleSearchPath;
pub use types::{OutputFormat, RolePolicy};
