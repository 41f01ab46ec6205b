//! Requirements manifest parsing
//!
//! `deployment/requirements.yml` lists the roles a deployment expects,
//! in either of the shapes `ansible-galaxy` accepts:
//!
//! ```yaml
//! - src: geerlingguy.nginx
//!   version: 2.0.0
//! - name: common
//!   src: https://github.com/example/ansible-common
//!   version: 1.2.0
//! ```
//!
//! or a mapping whose `roles:` key holds that list. Collections are not
//! roles and are ignored.
//!
//! Versions are compared as text. An unquoted `version: 1.10` is a YAML
//! float whose written form is already lost (`1.1`), so float versions
//! are rejected; quote them instead.

use serde::Serialize;
use serde_yaml::Value;
use std::fs;
use std::path::Path;

use crate::error::{FabError, Result};

/// Default manifest location, relative to the project root
pub const REQUIREMENTS_FILE: &str = "deployment/requirements.yml";

/// One role entry of the requirements manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRequirement {
    /// Derived name: the explicit `name`, else the `src` identifier
    pub name: String,
    /// Exact version the deployment expects
    pub version: String,
    /// Source identifier as written in the manifest, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
}

impl RoleRequirement {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            src: None,
        }
    }

    /// Build a requirement known only by its source identifier
    pub fn from_src(src: impl Into<String>, version: impl Into<String>) -> Self {
        let src = src.into();
        Self {
            name: src.clone(),
            version: version.into(),
            src: Some(src),
        }
    }

    fn from_entry(index: usize, entry: &Value) -> Result<Self> {
        let Value::Mapping(map) = entry else {
            return Err(FabError::malformed_requirement(
                index,
                "entry is not a mapping",
            ));
        };

        let field = |key: &str| map.get(key).and_then(scalar_to_string);
        let name = field("name");
        let src = field("src");

        let derived = name
            .or_else(|| src.clone())
            .ok_or_else(|| {
                FabError::malformed_requirement(index, "entry has neither 'name' nor 'src'")
            })?;

        if let Some(Value::Number(n)) = map.get("version") {
            if n.is_f64() {
                return Err(FabError::malformed_requirement(
                    index,
                    format!("role '{}' has unquoted version {}; quote it", derived, n),
                ));
            }
        }
        let version = field("version").ok_or_else(|| {
            FabError::malformed_requirement(index, format!("role '{}' has no version", derived))
        })?;

        Ok(Self {
            name: derived,
            version,
            src,
        })
    }
}

/// Textual form of a YAML scalar; `None` for null, empty strings and
/// non-scalars.
fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Parse manifest text. `path` is only used in error messages.
///
/// Entries are returned in manifest order.
pub fn parse_manifest(content: &str, path: &Path) -> Result<Vec<RoleRequirement>> {
    let malformed = |reason: String| FabError::ManifestMalformed {
        path: path.to_path_buf(),
        reason,
    };

    let document: Value = serde_yaml::from_str(content).map_err(|e| malformed(e.to_string()))?;

    let entries = match document {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(entries) => entries,
        Value::Mapping(mut map) => match map.remove("roles") {
            Some(Value::Sequence(entries)) => entries,
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(malformed("'roles' is not a list".to_string())),
        },
        _ => {
            return Err(malformed(
                "expected a list of roles or a mapping with a 'roles' list".to_string(),
            ));
        }
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| RoleRequirement::from_entry(index, entry))
        .collect()
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<Vec<RoleRequirement>> {
    let content = fs::read_to_string(path).map_err(|source| FabError::ManifestUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let requirements = parse_manifest(&content, path)?;
    tracing::debug!(
        manifest = %path.display(),
        count = requirements.len(),
        "Loaded role requirements"
    );
    Ok(requirements)
}

/// Sort by derived name. Stable, so duplicate names keep manifest order.
pub fn sort_by_name(requirements: &mut [RoleRequirement]) {
    requirements.sort_by(|a, b| a.name.cmp(&b.name));
}
