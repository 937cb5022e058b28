//! Datasource Manifest (datasources.yml)
//!
//! Maps datasource identifiers to their adapter, display name and
//! adapter-declared connection fields. New datasources are appended as raw
//! text so hand edits elsewhere in the file are kept.

use crate::document::{ConfigDocument, SETTING_KEYS};
use crate::{ConfigError, ConfigResult, MANIFEST_FILE};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// One datasource entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasourceRecord {
    /// Adapter kind (e.g. "postgres", "snowflake")
    pub adapter: String,

    /// Human readable name
    pub name: String,

    /// Remaining connection fields (host, port, database, ...)
    #[serde(flatten)]
    pub fields: Mapping,
}

/// Parsed datasource manifest
#[derive(Debug, Clone, Default)]
pub struct DatasourceManifest {
    path: PathBuf,
    entries: Mapping,
}

impl DatasourceManifest {
    /// Manifest path for a project directory
    pub fn path_for(project_dir: &Path) -> PathBuf {
        project_dir.join(MANIFEST_FILE)
    }

    /// Load the manifest; a missing or empty file is an empty manifest
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let entries = ConfigDocument::load_optional(path)?
            .map(|doc| doc.mapping().clone())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Datasource identifiers in file order
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().filter_map(Value::as_str).collect()
    }

    /// Raw entries in file order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .filter_map(|(key, raw)| key.as_str().map(|key| (key, raw)))
    }

    /// Look up a datasource record
    ///
    /// Returns `Ok(None)` for unknown identifiers and an error when the entry
    /// exists but lacks `adapter` or `name`.
    pub fn get(&self, id: &str) -> ConfigResult<Option<DatasourceRecord>> {
        let Some(raw) = self.entries.get(id) else {
            return Ok(None);
        };

        for field in ["adapter", "name"] {
            if raw.get(field).and_then(Value::as_str).is_none() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                    datasource: id.to_string(),
                });
            }
        }

        serde_yaml::from_value(raw.clone())
            .map(Some)
            .map_err(|e| ConfigError::YamlParseError {
                file: self.path.clone(),
                error: e,
            })
    }

    /// Display name for an identifier, if it has one
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.entries
            .get(id)
            .and_then(|raw| raw.get("name"))
            .and_then(Value::as_str)
    }

    /// First free identifier: `base`, then `base_1`, `base_2`, ...
    ///
    /// Setting names are never free, since a credential block under one of
    /// them would replace the setting in `.strata`.
    pub fn unique_key(&self, base: &str) -> String {
        let mut key = base.to_string();
        let mut suffix = 1;
        while self.contains(&key) || SETTING_KEYS.contains(&key.as_str()) {
            key = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        key
    }

    /// Append a rendered datasource block to the manifest file
    pub fn append_entry(path: &Path, block: &str) -> ConfigResult<()> {
        let mut content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(ConfigError::IoError(e)),
        };

        content.push('\n');
        content.push_str(block);
        if !block.ends_with('\n') {
            content.push('\n');
        }

        std::fs::write(path, content)?;
        tracing::debug!(path = %path.display(), "appended datasource entry");
        Ok(())
    }
}
