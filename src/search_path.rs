//! Ordered list of directories Ansible searches for roles.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Role search path; the first directory containing the role wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct RoleSearchPath {
    dirs: Vec<PathBuf>,
}

impl RoleSearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Parse a colon-separated `roles_path` value.
    ///
    /// Empty entries are dropped; a leading `~` expands to `home`.
    pub fn parse(value: &str, home: Option<&Path>) -> Self {
        value
            .split(':')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let expanded = shellexpand::tilde_with_context(entry, || home.and_then(Path::to_str));
                PathBuf::from(expanded.as_ref())
            })
            .collect()
    }

    /// Anchor relative entries at `base`; absolute entries are unchanged.
    pub fn relative_to(self, base: &Path) -> Self {
        self.dirs.into_iter().map(|dir| base.join(dir)).collect()
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Directory where role `name` is installed, if any.
    pub fn find_role(&self, name: &str) -> Option<PathBuf> {
        let found = self
            .dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_dir());
        tracing::trace!(role = name, found = ?found, "Searched role path");
        found
    }
}

impl FromIterator<PathBuf> for RoleSearchPath {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for RoleSearchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.dirs.iter().map(|d| d.display().to_string()).collect();
        write!(f, "{}", joined.join(":"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_splits_and_expands() {
        let path = RoleSearchPath::parse(
            "~/.ansible/roles::/usr/share/ansible/roles: roles ",
            Some(Path::new("/home/deploy")),
        );
        assert_eq!(
            path.dirs(),
            &[
                PathBuf::from("/home/deploy/.ansible/roles"),
                PathBuf::from("/usr/share/ansible/roles"),
                PathBuf::from("roles"),
            ]
        );
    }

    #[test]
    fn test_parse_without_home_keeps_tilde() {
        let path = RoleSearchPath::parse("~/.ansible/roles", None);
        assert_eq!(path.dirs(), &[PathBuf::from("~/.ansible/roles")]);
    }

    #[test]
    fn test_display_round_trips_separator() {
        let path = RoleSearchPath::new(vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(path.to_string(), "/a:/b");
    }

    #[test]
    fn test_find_role_first_match_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::create_dir(first.path().join("common")).unwrap();
        fs::create_dir(second.path().join("common")).unwrap();
        fs::create_dir(second.path().join("web")).unwrap();

        let path = RoleSearchPath::new(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(path.find_role("common"), Some(first.path().join("common")));
        assert_eq!(path.find_role("web"), Some(second.path().join("web")));
        assert_eq!(path.find_role("db"), None);
    }

    #[test]
    fn test_find_role_ignores_plain_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("common"), "not a role").unwrap();
        let path = RoleSearchPath::new(vec![dir.path().to_path_buf()]);
        assert_eq!(path.find_role("common"), None);
    }
}
