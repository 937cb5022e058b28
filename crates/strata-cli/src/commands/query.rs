//! Commands that talk to a datasource (strata ds test/tables/meta/exec)
//!
//! Connection problems are reported and the command still succeeds; only
//! configuration errors abort.

use super::CommandError;
use crate::connector::{Connection, ConnectionConfig, ConnectorFactory, Scope, TableFilter};
use crate::output::{self, green_check, with_spinner};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use strata_config::{ConfigStore, CredentialBlock, DatasourceManifest, DatasourceRecord};

/// Config key limiting how many result rows are printed
pub const ROW_LIMIT_KEY: &str = "row_limit";
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Where the SQL for `ds exec` comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    Inline(String),
    File(PathBuf),
}

impl QuerySource {
    pub fn read(&self) -> Result<String> {
        match self {
            QuerySource::Inline(sql) => Ok(sql.clone()),
            QuerySource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file {}", path.display())),
        }
    }
}

struct Target {
    record: DatasourceRecord,
    connection: Box<dyn Connection>,
}

/// Look up the datasource and open a connection, reporting anything that
/// goes wrong along the way.
fn open(
    store: &ConfigStore,
    factory: &dyn ConnectorFactory,
    ds_key: &str,
) -> Result<Option<Target>> {
    let manifest = DatasourceManifest::load(&DatasourceManifest::path_for(store.project_dir()))
        .context("Failed to read datasources.yml")?;
    let Some(record) = manifest.get(ds_key)? else {
        CommandError::DatasourceNotFound(ds_key.to_string()).report();
        return Ok(None);
    };

    let credentials = CredentialBlock::fetch(store, ds_key);
    let config = ConnectionConfig::build(&record, &credentials);
    tracing::debug!(ds_key, adapter = %record.adapter, "opening connection");

    match factory.create(&record.adapter, &config) {
        Ok(connection) => Ok(Some(Target { record, connection })),
        Err(e) => {
            output::error(e);
            Ok(None)
        }
    }
}

/// Check that a datasource is reachable
pub fn test(store: &ConfigStore, factory: &dyn ConnectorFactory, ds_key: &str) -> Result<()> {
    let Some(mut target) = open(store, factory, ds_key)? else {
        return Ok(());
    };

    let message = format!("Testing connection to '{}'", ds_key);
    match with_spinner(&message, || target.connection.test_connection()) {
        Ok(()) => println!(
            "{} Connection to '{}' ({}) succeeded",
            green_check(),
            ds_key,
            target.record.adapter
        ),
        Err(e) => output::error(e),
    }
    Ok(())
}

/// List tables of a datasource
pub fn tables(
    store: &ConfigStore,
    factory: &dyn ConnectorFactory,
    ds_key: &str,
    filter: &TableFilter,
) -> Result<()> {
    let Some(mut target) = open(store, factory, ds_key)? else {
        return Ok(());
    };

    match with_spinner("Fetching tables", || target.connection.tables(filter)) {
        Ok(tables) if tables.is_empty() => println!("No tables found."),
        Ok(tables) => {
            let rows: Vec<Vec<String>> = tables.into_iter().map(|t| vec![t]).collect();
            print!("{}", output::render_table(&[], &rows));
        }
        Err(e) => output::error(e),
    }
    Ok(())
}

/// Show column metadata for a table
pub fn meta(
    store: &ConfigStore,
    factory: &dyn ConnectorFactory,
    ds_key: &str,
    table: &str,
    scope: &Scope,
) -> Result<()> {
    let Some(mut target) = open(store, factory, ds_key)? else {
        return Ok(());
    };

    match with_spinner("Fetching metadata", || target.connection.metadata(table, scope)) {
        Ok(metadata) => {
            println!("{}", metadata.table.bold());
            let headers = ["column", "type", "nullable"].map(String::from);
            let rows: Vec<Vec<String>> = metadata
                .columns
                .into_iter()
                .map(|c| vec![c.name, c.data_type, c.nullable.to_string()])
                .collect();
            print!("{}", output::render_table(&headers, &rows));
        }
        Err(e) => output::error(e),
    }
    Ok(())
}

/// Run a query and print the (truncated) result
pub fn exec(
    store: &ConfigStore,
    factory: &dyn ConnectorFactory,
    ds_key: &str,
    source: &QuerySource,
) -> Result<()> {
    let limit = row_limit(store)?;
    let sql = source.read()?;

    let Some(mut target) = open(store, factory, ds_key)? else {
        return Ok(());
    };

    match with_spinner("Running query", || target.connection.execute(&sql)) {
        Ok(result) => {
            let total = result.rows.len();
            let shown: Vec<Vec<String>> = result.rows.into_iter().take(limit).collect();
            print!("{}", output::render_table(&result.columns, &shown));
            if total > shown.len() {
                println!("... {} of {} rows shown ({} = {})", shown.len(), total, ROW_LIMIT_KEY, limit);
            } else {
                println!("({} rows)", total);
            }
        }
        Err(e) => output::error(e),
    }
    Ok(())
}

/// Configured row limit; a value that is not a non-negative integer is a
/// configuration error.
pub fn row_limit(store: &ConfigStore) -> Result<usize> {
    if store.get(ROW_LIMIT_KEY).is_none() {
        return Ok(DEFAULT_ROW_LIMIT);
    }
    let limit = store.get_int(ROW_LIMIT_KEY)?;
    usize::try_from(limit).with_context(|| format!("{} must not be negative", ROW_LIMIT_KEY))
}
