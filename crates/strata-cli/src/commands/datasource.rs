//! Datasource management commands (strata ds list/add/auth, strata adapters)

use super::CommandError;
use crate::adapters;
use crate::credentials::CredentialCollector;
use crate::output::green_check;
use crate::prompt::Prompt;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use strata_config::{ConfigStore, CredentialBlock, DatasourceManifest, SETTING_KEYS};

/// Print the supported adapter kinds
pub fn adapters() {
    println!("{}", "Supported adapters:".bold());
    for kind in adapters::supported() {
        println!("  {}", kind);
    }
}

#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    key: &'a str,
    name: Option<&'a str>,
}

/// List configured datasources as `key => name`
pub fn list(project_dir: &Path, json: bool) -> Result<()> {
    let manifest = DatasourceManifest::load(&DatasourceManifest::path_for(project_dir))
        .context("Failed to read datasources.yml")?;

    if json {
        let entries: Vec<ListEntry> = manifest
            .ids()
            .into_iter()
            .map(|key| ListEntry {
                key,
                name: manifest.name_of(key),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if manifest.is_empty() {
        println!("No datasources configured. Add one with 'strata ds add <adapter>'.");
        return Ok(());
    }

    for (key, raw) in manifest.entries() {
        let name = raw.get("name").and_then(|n| n.as_str()).unwrap_or("(unnamed)");
        println!("  {} => {}", key.magenta(), name);
    }
    Ok(())
}

/// Arguments for the add command
#[derive(Debug, Clone)]
pub struct AddArgs {
    /// Adapter kind of the new datasource
    pub adapter: String,
    /// Preferred identifier; defaults to the adapter kind
    pub key: Option<String>,
    /// Project directory (defaults to current)
    pub project_dir: PathBuf,
}

/// Append a template entry for a new datasource.
///
/// Returns the identifier it was stored under, or `None` when the adapter is
/// unknown (reported, nothing written).
pub fn add(args: AddArgs) -> Result<Option<String>> {
    let kind = adapters::normalize(&args.adapter);
    if !adapters::is_supported(&kind) {
        CommandError::UnsupportedAdapter(args.adapter).report();
        return Ok(None);
    }

    let path = DatasourceManifest::path_for(&args.project_dir);
    let manifest = DatasourceManifest::load(&path).context("Failed to read datasources.yml")?;

    let base = args
        .key
        .as_deref()
        .map(adapters::url_safe_str)
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| kind.clone());
    let ds_key = manifest.unique_key(&base);

    let Some(block) = adapters::template(&kind, &ds_key) else {
        CommandError::UnsupportedAdapter(kind).report();
        return Ok(None);
    };
    DatasourceManifest::append_entry(&path, &block)
        .context("Failed to update datasources.yml")?;

    println!(
        "{} Added datasource '{}' ({}) to {}",
        green_check(),
        ds_key,
        kind,
        strata_config::MANIFEST_FILE
    );
    println!("  Edit its connection fields, then run: strata ds auth {}", ds_key);
    Ok(Some(ds_key))
}

/// Collect and store credentials for a configured datasource
pub fn auth(
    store: &mut ConfigStore,
    ds_key: &str,
    remote: bool,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    if SETTING_KEYS.contains(&ds_key) {
        CommandError::SettingKey(ds_key.to_string()).report();
        return Ok(());
    }

    let manifest = DatasourceManifest::load(&DatasourceManifest::path_for(store.project_dir()))
        .context("Failed to read datasources.yml")?;
    let Some(record) = manifest.get(ds_key)? else {
        CommandError::DatasourceNotFound(ds_key.to_string()).report();
        return Ok(());
    };

    if remote {
        println!(
            "{} Remote credential storage is not available from this client; nothing was stored.",
            "Note:".yellow().bold()
        );
        return Ok(());
    }

    if !adapters::is_supported(&record.adapter) {
        CommandError::UnsupportedAdapter(record.adapter).report();
        return Ok(());
    }

    let mut collector = CredentialCollector::new(&record.adapter);
    if !collector.requires_credentials() {
        println!("{} datasources do not need credentials.", collector.adapter());
        return Ok(());
    }

    println!("Enter credentials for '{}' ({})", ds_key, collector.adapter());
    collector
        .collect(prompt)
        .context("Failed to read credentials")?;

    if collector.collected() {
        CredentialBlock::store(store, ds_key, collector.credentials())?;
        println!(
            "{} Credentials for '{}' saved to {}",
            green_check(),
            ds_key,
            store.local_path().display()
        );
    }
    Ok(())
}
