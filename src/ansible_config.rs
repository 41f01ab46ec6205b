//! Ansible configuration discovery.
//!
//! Ansible reads the first config file it finds, in this order:
//!
//! 1. `$ANSIBLE_CONFIG`
//! 2. `ansible.cfg` in the current directory
//! 3. `~/.ansible.cfg`
//! 4. `/etc/ansible/ansible.cfg`
//!
//! Only `[defaults] roles_path` is needed here. Discovery runs once in
//! `main`; the result travels inside [`crate::context::FabContext`].

use config::{Config, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

use crate::error::{FabError, Result};
use crate::search_path::RoleSearchPath;

/// System-wide Ansible config file
pub const SYSTEM_CONFIG_FILE: &str = "/etc/ansible/ansible.cfg";

/// `roles_path` Ansible uses when no config file sets one
pub const DEFAULT_ROLES_PATH: &str = "~/.ansible/roles:/usr/share/ansible/roles:/etc/ansible/roles";

/// The process inputs config discovery depends on.
#[derive(Debug, Clone)]
pub struct ConfigEnv {
    /// Value of `ANSIBLE_CONFIG`, if set and non-empty
    pub ansible_config: Option<PathBuf>,
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
    pub system_config: PathBuf,
}

impl ConfigEnv {
    /// Capture discovery inputs from the running process.
    pub fn from_process() -> Result<Self> {
        let ansible_config = std::env::var_os("ANSIBLE_CONFIG")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Ok(Self {
            ansible_config,
            cwd: std::env::current_dir()?,
            home: dirs::home_dir(),
            system_config: PathBuf::from(SYSTEM_CONFIG_FILE),
        })
    }

    /// Candidate config files in precedence order
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(4);
        if let Some(ref explicit) = self.ansible_config {
            candidates.push(self.cwd.join(explicit));
        }
        candidates.push(self.cwd.join("ansible.cfg"));
        if let Some(ref home) = self.home {
            candidates.push(home.join(".ansible.cfg"));
        }
        candidates.push(self.system_config.clone());
        candidates
    }
}

/// Path of the config file Ansible would use, or `None`.
pub fn find_config_file(env: &ConfigEnv) -> Option<PathBuf> {
    env.candidates().into_iter().find(|path| path.is_file())
}

/// The parts of the Ansible configuration tequila-fab consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsibleConfig {
    pub config_file: Option<PathBuf>,
    pub roles_path: RoleSearchPath,
}

impl AnsibleConfig {
    /// Locate and read the Ansible configuration.
    pub fn discover(env: &ConfigEnv) -> Result<Self> {
        let config_file = find_config_file(env);
        let configured = match config_file {
            Some(ref path) => read_roles_path(path)?,
            None => None,
        };

        let raw = configured.as_deref().unwrap_or(DEFAULT_ROLES_PATH);
        let roles_path = RoleSearchPath::parse(raw, env.home.as_deref()).relative_to(&env.cwd);

        tracing::info!(
            config_file = ?config_file,
            roles_path = %roles_path,
            "Resolved Ansible role search path"
        );

        Ok(Self {
            config_file,
            roles_path,
        })
    }
}

/// `[defaults] roles_path` from an INI config file, if set.
pub fn read_roles_path(path: &Path) -> Result<Option<String>> {
    let settings = Config::builder()
        .add_source(File::from(path).format(FileFormat::Ini))
        .build()
        .map_err(|e| FabError::config(format!("{}: {}", path.display(), e)))?;

    match settings.get_string("defaults.roles_path") {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(FabError::config(format!("{}: {}", path.display(), e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _root: TempDir,
        env: ConfigEnv,
    }

    /// A sandbox with separate cwd, home and /etc directories
    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        for dir in ["cwd", "home", "etc"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        let env = ConfigEnv {
            ansible_config: None,
            cwd: root.path().join("cwd"),
            home: Some(root.path().join("home")),
            system_config: root.path().join("etc/ansible.cfg"),
        };
        Fixture { _root: root, env }
    }

    fn write_cfg(path: &Path, roles_path: &str) {
        fs::write(path, format!("[defaults]\nroles_path = {}\n", roles_path)).unwrap();
    }

    #[test]
    fn test_no_config_uses_default_roles_path() {
        let fx = fixture();
        let cfg = AnsibleConfig::discover(&fx.env).unwrap();
        assert!(cfg.config_file.is_none());

        let home = fx.env.home.clone().unwrap();
        assert_eq!(
            cfg.roles_path.dirs(),
            &[
                home.join(".ansible/roles"),
                PathBuf::from("/usr/share/ansible/roles"),
                PathBuf::from("/etc/ansible/roles"),
            ]
        );
    }

    #[test]
    fn test_precedence_env_over_local_over_home_over_system() {
        let mut fx = fixture();
        let home = fx.env.home.clone().unwrap();
        write_cfg(&fx.env.system_config, "/system");
        assert_eq!(find_config_file(&fx.env), Some(fx.env.system_config.clone()));

        write_cfg(&home.join(".ansible.cfg"), "/home");
        assert_eq!(find_config_file(&fx.env), Some(home.join(".ansible.cfg")));

        write_cfg(&fx.env.cwd.join("ansible.cfg"), "/local");
        assert_eq!(find_config_file(&fx.env), Some(fx.env.cwd.join("ansible.cfg")));

        let explicit = fx.env.cwd.join("custom.cfg");
        write_cfg(&explicit, "/explicit");
        fx.env.ansible_config = Some(PathBuf::from("custom.cfg"));
        let cfg = AnsibleConfig::discover(&fx.env).unwrap();
        assert_eq!(cfg.config_file, Some(explicit));
        assert_eq!(cfg.roles_path.dirs(), &[PathBuf::from("/explicit")]);
    }

    #[test]
    fn test_missing_ansible_config_target_falls_through() {
        let mut fx = fixture();
        fx.env.ansible_config = Some(PathBuf::from("does-not-exist.cfg"));
        write_cfg(&fx.env.cwd.join("ansible.cfg"), "/local");
        let cfg = AnsibleConfig::discover(&fx.env).unwrap();
        assert_eq!(cfg.roles_path.dirs(), &[PathBuf::from("/local")]);
    }

    #[test]
    fn test_roles_path_is_split_and_expanded() {
        let fx = fixture();
        write_cfg(&fx.env.cwd.join("ansible.cfg"), "~/roles:/opt/roles");
        let cfg = AnsibleConfig::discover(&fx.env).unwrap();
        let home = fx.env.home.clone().unwrap();
        assert_eq!(
            cfg.roles_path.dirs(),
            &[home.join("roles"), PathBuf::from("/opt/roles")]
        );
    }

    #[test]
    fn test_relative_roles_path_is_anchored_at_cwd() {
        let fx = fixture();
        write_cfg(&fx.env.cwd.join("ansible.cfg"), "deployment/roles:/opt/roles");
        let cfg = AnsibleConfig::discover(&fx.env).unwrap();
        assert_eq!(
            cfg.roles_path.dirs(),
            &[fx.env.cwd.join("deployment/roles"), PathBuf::from("/opt/roles")]
        );
    }

    #[test]
    fn test_config_without_roles_path_uses_default() {
        let fx = fixture();
        fs::write(
            fx.env.cwd.join("ansible.cfg"),
            "[defaults]\nhost_key_checking = False\n",
        )
        .unwrap();
        assert_eq!(read_roles_path(&fx.env.cwd.join("ansible.cfg")).unwrap(), None);

        let cfg = AnsibleConfig::discover(&fx.env).unwrap();
        assert_eq!(cfg.roles_path.dirs().len(), 3);
    }
}
