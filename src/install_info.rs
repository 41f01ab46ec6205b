//! Role install metadata written by `ansible-galaxy install`.
//!
//! Each role installed by galaxy gets a small YAML record at
//! `meta/.galaxy_install_info`:
//!
//! ```yaml
//! install_date: Tue Mar  5 14:02:11 2024
//! version: 1.2.0
//! ```
//!
//! Roles copied or symlinked into the search path by hand have no such
//! file, so their version cannot be verified.

use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{FabError, Result};

/// Location of the metadata file inside a role directory
pub const INSTALL_INFO_PATH: &str = "meta/.galaxy_install_info";

#[derive(Debug, Deserialize)]
struct RawInstallInfo {
    version: Option<Value>,
}

/// Parsed install metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallInfo {
    pub version: String,
}

/// What the filesystem says about one installed role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledRoleInfo {
    pub directory: PathBuf,
    /// `None` when the role has no install metadata
    pub version: Option<String>,
}

/// Path of the metadata file for the role installed at `role_dir`
pub fn install_info_path(role_dir: &Path) -> PathBuf {
    role_dir.join(INSTALL_INFO_PATH)
}

/// Read the install metadata of the role at `role_dir`.
///
/// Returns `Ok(None)` when the metadata file does not exist. A file that
/// exists but cannot be read, is not YAML, or has no `version` field is
/// an error.
pub fn read_install_info(role_dir: &Path) -> Result<Option<InstallInfo>> {
    let path = install_info_path(role_dir);
    let unreadable = |reason: String| FabError::InstallInfoUnreadable {
        path: path.clone(),
        reason,
    };

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(unreadable(e.to_string())),
    };

    let raw: RawInstallInfo =
        serde_yaml::from_str(&content).map_err(|e| unreadable(e.to_string()))?;

    let version = match raw.version {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Null) | None => return Err(unreadable("missing 'version' field".to_string())),
        Some(other) => {
            return Err(unreadable(format!(
                "'version' is not a string: {:?}",
                other
            )));
        }
    };

    Ok(Some(InstallInfo { version }))
}

/// Probe an installed role directory.
pub fn probe_installed_role(role_dir: &Path) -> Result<InstalledRoleInfo> {
    let info = read_install_info(role_dir)?;
    Ok(InstalledRoleInfo {
        directory: role_dir.to_path_buf(),
        version: info.map(|i| i.version),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_info(role_dir: &Path, content: &str) {
        let meta = role_dir.join("meta");
        fs::create_dir_all(&meta).unwrap();
        fs::write(meta.join(".galaxy_install_info"), content).unwrap();
    }

    #[test]
    fn test_missing_metadata_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_install_info(dir.path()).unwrap(), None);

        let probed = probe_installed_role(dir.path()).unwrap();
        assert_eq!(probed.directory, dir.path());
        assert!(probed.version.is_none());
    }

    #[test]
    fn test_reads_version_ignoring_other_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_info(
            dir.path(),
            "install_date: Tue Mar  5 14:02:11 2024\nversion: 1.2.0\n",
        );
        let info = read_install_info(dir.path()).unwrap().unwrap();
        assert_eq!(info.version, "1.2.0");
    }

    #[test]
    fn test_numeric_version() {
        let dir = tempfile::tempdir().unwrap();
        write_info(dir.path(), "version: 3\n");
        let probed = probe_installed_role(dir.path()).unwrap();
        assert_eq!(probed.version.as_deref(), Some("3"));
    }

    #[test]
    fn test_empty_version_string_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        write_info(dir.path(), "version: ''\n");
        let info = read_install_info(dir.path()).unwrap().unwrap();
        assert_eq!(info.version, "");
    }

    #[test]
    fn test_missing_version_field_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_info(dir.path(), "install_date: today\n");
        let err = read_install_info(dir.path()).unwrap_err();
        assert!(matches!(err, FabError::InstallInfoUnreadable { .. }));
    }

    #[test]
    fn test_garbage_metadata_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write_info(dir.path(), "version: [unclosed\n");
        assert!(read_install_info(dir.path()).is_err());
    }
}
