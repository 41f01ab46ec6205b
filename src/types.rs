//! Small type-safe option enums shared by the CLI and the tasks.

use serde::Serialize;
use strum::Display;

/// How unverifiable roles affect the role version check.
///
/// | policy     | missing role          | locally installed role |
/// |------------|-----------------------|------------------------|
/// | `Strict`   | fatal                 | fatal                  |
/// | `Standard` | warning, then install | fatal                  |
/// | `Dev`      | warning, then install | warning                |
///
/// A version mismatch is fatal under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RolePolicy {
    Strict,
    #[default]
    Standard,
    Dev,
}

impl RolePolicy {
    /// `Strict` when `strict` is set, else the fully lenient `Dev`
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Dev }
    }

    /// Whether a role absent from the search path fails the check
    pub fn missing_fatal(self) -> bool {
        matches!(self, Self::Strict)
    }

    /// Whether a role installed without galaxy metadata fails the check
    pub fn local_fatal(self) -> bool {
        !matches!(self, Self::Dev)
    }
}

/// Output format of the role version report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, clap::ValueEnum)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
