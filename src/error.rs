//! Error handling module for tequila-fab
//!
//! Fatal conditions only. Per-role problems found while checking role
//! versions are reported as outcomes, never as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tequila-fab
#[derive(Error, Debug)]
pub enum FabError {
    /// The requirements manifest could not be read
    #[error("Cannot read requirements manifest {path:?}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requirements manifest is not a list of role entries
    #[error("Malformed requirements manifest {path:?}: {reason}")]
    ManifestMalformed { path: PathBuf, reason: String },

    /// A manifest entry has neither `name` nor `src`, or lacks a version
    #[error("Malformed requirement at entry {index}: {reason}")]
    MalformedRequirement { index: usize, reason: String },

    /// A role's install metadata exists but cannot be read or parsed
    #[error("Cannot read role install metadata {path:?}: {reason}")]
    InstallInfoUnreadable { path: PathBuf, reason: String },

    /// Ansible configuration errors (ansible.cfg loading, parsing)
    #[error("Ansible configuration error: {0}")]
    Config(String),

    /// A task that targets an inventory was run without `--env`
    #[error("This task requires an environment: pass --env <ENV>")]
    MissingEnvironment,

    /// Installed roles do not satisfy the requirements manifest
    #[error("Ansible galaxy role requirements are not satisfied ({mismatched} wrong version(s))")]
    RequirementsUnsatisfied { mismatched: usize },

    /// An ansible command exited unsuccessfully
    #[error("Command failed (exit code {exit_code}): {command}")]
    CommandFailed { command: String, exit_code: i32 },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tequila-fab operations
pub type Result<T> = std::result::Result<T, FabError>;

impl FabError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a malformed requirement error for manifest entry `index`
    pub fn malformed_requirement(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRequirement {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FabError::config("bad section");
        assert_eq!(err.to_string(), "Ansible configuration error: bad section");

        let err = FabError::malformed_requirement(3, "entry has neither 'name' nor 'src'");
        assert_eq!(
            err.to_string(),
            "Malformed requirement at entry 3: entry has neither 'name' nor 'src'"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FabError = io_err.into();
        assert!(matches!(err, FabError::Io(_)));
    }

    #[test]
    fn test_command_failed_mentions_command() {
        let err = FabError::CommandFailed {
            command: "ansible-galaxy install -i -r deployment/requirements.yml".to_string(),
            exit_code: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("ansible-galaxy install"));
    }
}
