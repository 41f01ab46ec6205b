//! Type-safe arguments for `ansible-galaxy`.

use std::path::PathBuf;

use crate::command_args::CommandArgs;

/// `ansible-galaxy install -r <requirements>`
#[derive(Debug, Clone)]
pub struct GalaxyInstallArgs {
    pub requirements: PathBuf,
    /// `-i`: keep going when a role fails to install
    pub ignore_errors: bool,
}

impl GalaxyInstallArgs {
    pub fn new(requirements: impl Into<PathBuf>) -> Self {
        Self {
            requirements: requirements.into(),
            ignore_errors: true,
        }
    }
}

impl CommandArgs for GalaxyInstallArgs {
    fn program(&self) -> &'static str {
        "ansible-galaxy"
    }

    fn to_cli_args(&self) -> Vec<String> {
        let mut args = vec!["install".to_string()];
        if self.ignore_errors {
            args.push("-i".to_string());
        }
        args.push("-r".to_string());
        args.push(self.requirements.display().to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args() {
        let args = GalaxyInstallArgs::new("deployment/requirements.yml");
        assert_eq!(
            args.to_cli_args(),
            vec!["install", "-i", "-r", "deployment/requirements.yml"]
        );
        assert_eq!(
            args.display_command(),
            "ansible-galaxy install -i -r deployment/requirements.yml"
        );
    }

    #[test]
    fn test_install_args_without_ignore_errors() {
        let args = GalaxyInstallArgs {
            requirements: PathBuf::from("reqs.yml"),
            ignore_errors: false,
        };
        assert_eq!(args.to_cli_args(), vec!["install", "-r", "reqs.yml"]);
    }
}
