//! Datasource connectors
//!
//! Commands talk to warehouses through [`Connection`]. Concrete drivers are
//! provided by a [`ConnectorFactory`]; this client ships without any, so the
//! default factory reports every adapter as unavailable.

use serde_yaml::{Mapping, Value};
use strata_config::DatasourceRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("No driver available for adapter '{0}'")]
    DriverUnavailable(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Optional overrides of the configured database/catalog/schema
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub database: Option<String>,
    pub catalog: Option<String>,
    pub schema: Option<String>,
}

/// Table listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilter {
    /// Shell-style pattern on the table name
    pub pattern: Option<String>,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub table: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// An open connection to one datasource
pub trait Connection {
    fn test_connection(&mut self) -> Result<(), ConnectorError>;

    fn tables(&mut self, filter: &TableFilter) -> Result<Vec<String>, ConnectorError>;

    fn metadata(&mut self, table: &str, scope: &Scope) -> Result<TableMetadata, ConnectorError>;

    fn execute(&mut self, sql: &str) -> Result<QueryResult, ConnectorError>;
}

/// Builds connections for adapter kinds
pub trait ConnectorFactory {
    fn create(&self, adapter: &str, config: &Mapping)
        -> Result<Box<dyn Connection>, ConnectorError>;
}

/// Factory used when no drivers are linked in
#[derive(Debug, Default)]
pub struct UnavailableConnectors;

impl ConnectorFactory for UnavailableConnectors {
    fn create(
        &self,
        adapter: &str,
        _config: &Mapping,
    ) -> Result<Box<dyn Connection>, ConnectorError> {
        Err(ConnectorError::DriverUnavailable(adapter.to_string()))
    }
}

/// Effective connection settings for a datasource
pub struct ConnectionConfig;

impl ConnectionConfig {
    /// Manifest fields, then `adapter` and `name`, then credentials on top
    pub fn build(record: &DatasourceRecord, credentials: &Mapping) -> Mapping {
        let mut config = record.fields.clone();
        config.insert(
            Value::from("adapter"),
            Value::from(record.adapter.as_str()),
        );
        config.insert(Value::from("name"), Value::from(record.name.as_str()));
        for (key, value) in credentials {
            config.insert(key.clone(), value.clone());
        }
        config
    }
}
