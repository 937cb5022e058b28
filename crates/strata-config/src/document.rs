//! Configuration Documents (.strata)
//!
//! A [`ConfigDocument`] is an ordered YAML mapping read from a global or a
//! project `.strata` file. Documents are snapshots: changing one in memory
//! never touches the file it came from unless [`ConfigDocument::write_to`] is
//! called explicitly.

use crate::{ConfigError, ConfigResult};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Default `server` value for new configurations
pub const DEFAULT_SERVER: &str = "http://localhost:3030";

/// Default `log_level` value for new configurations
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Top-level `.strata` keys holding settings rather than credential blocks
pub const SETTING_KEYS: &[&str] = &["api_key", "server", "log_level", "row_limit"];

/// Ordered key/value configuration document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigDocument {
    /// File the document was read from, if any
    source: Option<PathBuf>,

    data: Mapping,
}

impl ConfigDocument {
    /// Empty document with no backing file
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in baseline settings
    pub fn defaults() -> Self {
        let mut data = Mapping::new();
        data.insert("api_key".into(), "".into());
        data.insert("server".into(), DEFAULT_SERVER.into());
        data.insert("log_level".into(), DEFAULT_LOG_LEVEL.into());
        Self { source: None, data }
    }

    /// Parse a document from text. `file` is only used for error reporting.
    pub fn parse(content: &str, file: &Path) -> ConfigResult<Self> {
        if is_blank_document(content) {
            return Ok(Self {
                source: Some(file.to_path_buf()),
                data: Mapping::new(),
            });
        }

        let value: Value =
            serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParseError {
                file: file.to_path_buf(),
                error: e,
            })?;

        let data = match value {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => return Err(ConfigError::NotAMapping(file.to_path_buf())),
        };

        Ok(Self {
            source: Some(file.to_path_buf()),
            data,
        })
    }

    /// Load a document from a file that must exist
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Load a document, treating a missing file as absent
    pub fn load_optional(path: &Path) -> ConfigResult<Option<Self>> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ConfigError::IoError(e)),
        }
    }

    /// Serialize and write the whole document, creating parent directories
    pub fn write_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }

    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        serde_yaml::to_string(&self.data).map_err(ConfigError::SerializeError)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Top-level keys in document order (non-string keys are skipped)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().filter_map(Value::as_str)
    }

    pub fn mapping(&self) -> &Mapping {
        &self.data
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Merge another document into this one.
    /// Top-level keys of `other` replace ours wholesale; nested mappings are
    /// not merged field by field.
    pub fn merge(&mut self, other: &ConfigDocument) {
        for (key, value) in &other.data {
            self.data.insert(key.clone(), value.clone());
        }
    }
}

/// True when the text holds nothing but whitespace and comments
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let trimmed = line.trim();
        trimmed.is_empty() || trimmed.starts_with('#')
    })
}
