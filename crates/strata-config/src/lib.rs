//! Strata Configuration System
//!
//! Provides configuration management for Strata projects including:
//! - Global user configuration (`$XDG_CONFIG_HOME/.strata` or `~/.config/.strata`)
//! - Project configuration (`./.strata`), which also holds per-datasource credentials
//! - The datasource manifest (`./datasources.yml`)
//! - Surgical rewriting of named credential blocks
//!
//! # Configuration Hierarchy
//!
//! Configuration is merged in the following order (later overrides earlier):
//! 1. Built-in defaults (`api_key`, `server`, `log_level`)
//! 2. Global config
//! 3. Project config
//!
//! The merge is shallow: a top-level key present in a later layer replaces the
//! whole value from an earlier one.
//!
//! # Example
//!
//! ```no_run
//! use strata_config::{ConfigStore, ValueKind};
//! use std::path::Path;
//!
//! let store = ConfigStore::load(Path::new(".")).unwrap();
//! let server = store.get_str("server");
//! let verbose = store.get_typed("verbose", ValueKind::Boolean).unwrap();
//! ```

pub mod credential;
pub mod document;
pub mod manifest;
pub mod rewriter;
pub mod store;
pub mod typed;

use std::path::PathBuf;
use thiserror::Error;

/// File name of both the global and the project configuration documents.
pub const CONFIG_FILE: &str = ".strata";

/// File name of the per-project datasource manifest.
pub const MANIFEST_FILE: &str = "datasources.yml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Not a valid Strata project: no .strata file in {}", .0.display())]
    NotAProject(PathBuf),

    #[error("Invalid {kind} value for '{key}': {value}")]
    TypeConversion {
        key: String,
        kind: ValueKind,
        value: String,
    },

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid YAML syntax in {}: {error}", file.display())]
    YamlParseError {
        file: PathBuf,
        error: serde_yaml::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(serde_yaml::Error),

    #[error("Top level of {} must be a mapping", .0.display())]
    NotAMapping(PathBuf),

    #[error("Missing required field '{field}' in datasource '{datasource}'")]
    MissingField { field: String, datasource: String },

    #[error("Invalid block key '{0}'")]
    InvalidKey(String),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use credential::CredentialBlock;
pub use document::{ConfigDocument, SETTING_KEYS};
pub use manifest::{DatasourceManifest, DatasourceRecord};
pub use rewriter::{BlockRewriter, FieldMap};
pub use store::{ConfigPaths, ConfigStore};
pub use typed::{TypedValue, ValueKind};

pub use serde_yaml::{Mapping, Value};
