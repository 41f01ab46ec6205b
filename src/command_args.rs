//! Type-safe argument contracts for the Ansible command-line tools.
//!
//! Each task builds a struct implementing [`CommandArgs`] instead of a
//! shell string. The struct definition is the contract: flag spelling
//! lives in one `to_cli_args` and arguments are passed as an argv vector,
//! so values never need shell quoting.

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: executable name, resolved through `PATH`.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `get_env_vars()`: extra environment for the child.
pub trait CommandArgs {
    fn program(&self) -> &'static str;

    fn to_cli_args(&self) -> Vec<String>;

    fn get_env_vars(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Command line for logs and dry-run output
    fn display_command(&self) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.to_cli_args());
        parts.join(" ")
    }
}
