//! Project guard
//!
//! Most commands only make sense inside a Strata project. The guard runs
//! before any command body and rejects everything outside the allow-list
//! when the working directory has no `.strata` file.

use std::path::Path;
use strata_config::ConfigStore;
use thiserror::Error;

/// Commands that may run anywhere
pub const ALLOWED_COMMANDS: &[&str] = &["init", "help", "adapters", "version", "ds adapters"];

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("This is not a valid strata project")]
    NotAProject,
}

/// Whether `command` may run outside a project
pub fn is_allowed(command: &str) -> bool {
    ALLOWED_COMMANDS.contains(&command)
}

/// Reject `command` when `cwd` is not a project root and the command is
/// not allow-listed.
pub fn check(command: &str, cwd: &Path) -> Result<(), GuardError> {
    if is_allowed(command) || ConfigStore::is_project_root(cwd) {
        return Ok(());
    }

    tracing::debug!(command, dir = %cwd.display(), "blocked outside project");
    Err(GuardError::NotAProject)
}
