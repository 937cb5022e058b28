//! Credential blocks stored in the project `.strata` file

use crate::rewriter::{BlockRewriter, FieldMap};
use crate::store::ConfigStore;
use crate::ConfigResult;
use serde_yaml::{Mapping, Value};

/// Access to the per-datasource credential block
pub struct CredentialBlock;

impl CredentialBlock {
    /// Existing credentials for `ds_key`, or an empty mapping
    pub fn fetch(store: &ConfigStore, ds_key: &str) -> Mapping {
        match store.get(ds_key) {
            Some(Value::Mapping(fields)) => fields.clone(),
            _ => Mapping::new(),
        }
    }

    /// Persist credentials for `ds_key` into the project file and refresh
    /// the store so the new block is visible.
    pub fn store(store: &mut ConfigStore, ds_key: &str, fields: &FieldMap) -> ConfigResult<()> {
        store.require_project()?;
        BlockRewriter::new(store.local_path()).replace(ds_key, fields)?;
        store.reload()
    }

    /// Drop the credential block for `ds_key`. Returns whether one existed.
    pub fn forget(store: &mut ConfigStore, ds_key: &str) -> ConfigResult<bool> {
        store.require_project()?;
        let removed = BlockRewriter::new(store.local_path()).remove(ds_key)?;
        if removed {
            store.reload()?;
        }
        Ok(removed)
    }
}
