//! Type-safe arguments for `ansible-playbook`.
//!
//! Project layout assumed by the deployment tasks:
//!
//! ```text
//! deployment/
//!   environments/<env>/inventory
//!   playbooks/<play>.yml
//!   requirements.yml
//! ```

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::command_args::CommandArgs;

/// Playbook run when none is named
pub const DEFAULT_PLAYBOOK: &str = "site";

/// Value of `--extra-vars`
#[derive(Debug, Clone, PartialEq)]
pub enum ExtraVars {
    /// Passed through untouched (`key=value ...`, JSON, or `@file`)
    Raw(String),
    /// Serialized as compact JSON
    Json(Value),
}

impl ExtraVars {
    pub fn render(&self) -> String {
        match self {
            Self::Raw(raw) => raw.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

/// Inventory path for environment `env`, relative to the project
pub fn inventory_path(env: &str) -> PathBuf {
    Path::new("deployment/environments").join(env).join("inventory")
}

/// Playbook path for `play`, relative to the project
pub fn playbook_path(play: &str) -> PathBuf {
    Path::new("deployment/playbooks").join(format!("{}.yml", play))
}

/// `ansible-playbook -i <inventory> <playbook> ...`
#[derive(Debug, Clone)]
pub struct PlaybookArgs {
    pub inventory: PathBuf,
    pub playbook: PathBuf,
    pub extra_vars: Option<ExtraVars>,
    /// Sets `repo_branch`
    pub branch: Option<String>,
    /// `-l` host pattern
    pub limit: Option<String>,
    /// Number of `v`s passed to ansible (1-4)
    pub verbosity: Option<u8>,
    /// Sets `ansible_working_directory`
    pub working_directory: PathBuf,
}

impl PlaybookArgs {
    pub fn new(env: &str, play: &str, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            inventory: inventory_path(env),
            playbook: playbook_path(play),
            extra_vars: None,
            branch: None,
            limit: None,
            verbosity: None,
            working_directory: working_directory.into(),
        }
    }
}

impl CommandArgs for PlaybookArgs {
    fn program(&self) -> &'static str {
        "ansible-playbook"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec![
            "-i".to_string(),
            self.inventory.display().to_string(),
            self.playbook.display().to_string(),
        ];
        if let Some(ref vars) = self.extra_vars {
            args.push(format!("--extra-vars={}", vars.render()));
        }
        if let Some(ref branch) = self.branch {
            args.push("-e".to_string());
            args.push(format!("repo_branch={}", branch));
        }
        if let Some(ref limit) = self.limit {
            args.push("-l".to_string());
            args.push(limit.clone());
        }
        if let Some(level) = self.verbosity.filter(|&v| v > 0) {
            args.push(format!("-{}", "v".repeat(level as usize)));
        }
        args.push("-e".to_string());
        args.push(format!(
            "ansible_working_directory={}",
            self.working_directory.display()
        ));
        args
    }
}
