//! Configuration Store
//!
//! Loads the global and project documents and merges them with the built-in
//! defaults into a single flat view.

use crate::document::{ConfigDocument, DEFAULT_LOG_LEVEL, DEFAULT_SERVER};
use crate::typed::{self, TypedValue, ValueKind};
use crate::{ConfigError, ConfigResult, CONFIG_FILE};
use serde_yaml::{Mapping, Value};
use std::env;
use std::path::{Path, PathBuf};

/// Locations of the two configuration documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Global user config
    pub global: PathBuf,

    /// Project config
    pub local: PathBuf,
}

impl ConfigPaths {
    /// Resolve paths for a project directory using the process environment
    pub fn resolve(project_dir: &Path) -> ConfigResult<Self> {
        Ok(Self {
            global: global_config_path()?,
            local: local_config_path(project_dir),
        })
    }

    pub fn new(global: impl Into<PathBuf>, local: impl Into<PathBuf>) -> Self {
        Self {
            global: global.into(),
            local: local.into(),
        }
    }
}

/// Global config directory: `$XDG_CONFIG_HOME`, else `~/.config`
pub fn global_config_dir() -> ConfigResult<PathBuf> {
    match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => {
            let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
            Ok(home.join(".config"))
        }
    }
}

/// Get the global config file path
pub fn global_config_path() -> ConfigResult<PathBuf> {
    Ok(global_config_dir()?.join(CONFIG_FILE))
}

/// Get the project config file path for a directory
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE)
}

/// Layered configuration store
///
/// Built once per invocation and passed to whoever needs settings. The
/// merged view only changes through [`ConfigStore::reload`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: ConfigPaths,

    /// Project directory the store was loaded for
    project_dir: PathBuf,

    global: Option<ConfigDocument>,

    local: Option<ConfigDocument>,

    merged: ConfigDocument,
}

impl ConfigStore {
    /// Load configuration for `project_dir` using environment-derived paths
    pub fn load(project_dir: &Path) -> ConfigResult<Self> {
        let paths = ConfigPaths::resolve(project_dir)?;
        Self::load_with_paths(project_dir, paths)
    }

    /// Load configuration from explicit document locations
    pub fn load_with_paths(project_dir: &Path, paths: ConfigPaths) -> ConfigResult<Self> {
        let mut store = Self {
            paths,
            project_dir: project_dir.to_path_buf(),
            global: None,
            local: None,
            merged: ConfigDocument::defaults(),
        };
        store.load_layers()?;
        Ok(store)
    }

    /// Load configuration and fail unless `project_dir` is a project root
    pub fn load_project(project_dir: &Path) -> ConfigResult<Self> {
        let store = Self::load(project_dir)?;
        store.require_project()?;
        Ok(store)
    }

    /// Discard the merged view and load both documents again
    pub fn reload(&mut self) -> ConfigResult<()> {
        tracing::debug!("reloading configuration");
        self.global = None;
        self.local = None;
        self.merged = ConfigDocument::defaults();
        self.load_layers()
    }

    fn load_layers(&mut self) -> ConfigResult<()> {
        if !self.paths.global.exists() && !self.paths.local.exists() {
            tracing::debug!(
                path = %self.paths.global.display(),
                "no configuration found, writing defaults"
            );
            ConfigDocument::defaults().write_to(&self.paths.global)?;
        }

        let global = ConfigDocument::load_optional(&self.paths.global)?;
        let local = ConfigDocument::load_optional(&self.paths.local)?;

        let mut merged = ConfigDocument::defaults();
        if let Some(doc) = &global {
            tracing::debug!(path = %self.paths.global.display(), "loaded global config");
            merged.merge(doc);
        }
        if let Some(doc) = &local {
            tracing::debug!(path = %self.paths.local.display(), "loaded project config");
            merged.merge(doc);
        }

        self.global = global;
        self.local = local;
        self.merged = merged;
        Ok(())
    }

    /// True iff a project config file exists directly in `path`
    pub fn is_project_root(path: &Path) -> bool {
        local_config_path(path).is_file()
    }

    /// Check if the store was loaded inside a project
    pub fn is_project(&self) -> bool {
        self.local.is_some()
    }

    pub fn require_project(&self) -> ConfigResult<()> {
        if self.is_project() {
            Ok(())
        } else {
            Err(ConfigError::NotAProject(self.project_dir.clone()))
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn global_path(&self) -> &Path {
        &self.paths.global
    }

    pub fn local_path(&self) -> &Path {
        &self.paths.local
    }

    pub fn global_document(&self) -> Option<&ConfigDocument> {
        self.global.as_ref()
    }

    pub fn local_document(&self) -> Option<&ConfigDocument> {
        self.local.as_ref()
    }

    /// The whole merged view
    pub fn merged(&self) -> &Mapping {
        self.merged.mapping()
    }

    /// Get a merged value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.merged.get(key)
    }

    /// Get a merged value if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get a merged value coerced to `kind`
    pub fn get_typed(&self, key: &str, kind: ValueKind) -> ConfigResult<TypedValue> {
        typed::coerce(key, self.get(key), kind)
    }

    pub fn get_bool(&self, key: &str) -> ConfigResult<bool> {
        typed::coerce_bool(key, self.get(key))
    }

    pub fn get_int(&self, key: &str) -> ConfigResult<i64> {
        typed::coerce_i64(key, self.get(key))
    }

    pub fn get_float(&self, key: &str) -> ConfigResult<f64> {
        typed::coerce_f64(key, self.get(key))
    }

    pub fn get_list(&self, key: &str) -> Vec<Value> {
        typed::coerce_list(self.get(key))
    }

    /// Configured API key, empty when unset
    pub fn api_key(&self) -> &str {
        self.get_str("api_key").unwrap_or_default()
    }

    /// Configured Strata server
    pub fn server(&self) -> &str {
        self.get_str("server").unwrap_or(DEFAULT_SERVER)
    }

    /// Configured log level
    pub fn log_level(&self) -> &str {
        self.get_str("log_level").unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
