//! Per-invocation task configuration.
//!
//! Everything a task needs (project location, target environment, role
//! policy, search path, run options) is resolved once in `main` and
//! handed to the tasks by reference. Nothing is cached globally.

use std::path::{Path, PathBuf};

use crate::command_runner::RunOptions;
use crate::error::FabError;
use crate::requirements::REQUIREMENTS_FILE;
use crate::search_path::RoleSearchPath;
use crate::types::{OutputFormat, RolePolicy};

#[derive(Debug, Clone)]
pub struct FabContext {
    /// Directory holding `deployment/`; ansible runs from here
    pub project_dir: PathBuf,
    /// Inventory name under `deployment/environments/`
    pub environment: Option<String>,
    pub policy: RolePolicy,
    pub search_path: RoleSearchPath,
    pub run: RunOptions,
    pub report_format: OutputFormat,
    pub color: bool,
}

impl FabContext {
    pub fn new(project_dir: impl Into<PathBuf>, search_path: RoleSearchPath) -> Self {
        let project_dir = project_dir.into();
        Self {
            run: RunOptions {
                dry_run: false,
                cwd: Some(project_dir.clone()),
            },
            project_dir,
            environment: None,
            policy: RolePolicy::default(),
            search_path,
            report_format: OutputFormat::default(),
            color: false,
        }
    }

    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_policy(mut self, policy: RolePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.run.dry_run = dry_run;
        self
    }

    pub fn with_report_format(mut self, format: OutputFormat) -> Self {
        self.report_format = format;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Absolute path of the requirements manifest
    pub fn requirements_file(&self) -> PathBuf {
        self.project_dir.join(REQUIREMENTS_FILE)
    }

    /// The target environment, or [`FabError::MissingEnvironment`]
    pub fn require_environment(&self) -> Result<&str, FabError> {
        self.environment
            .as_deref()
            .filter(|env| !env.trim().is_empty())
            .ok_or(FabError::MissingEnvironment)
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }
}
