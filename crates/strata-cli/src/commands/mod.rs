pub mod datasource;
pub mod init;
pub mod query;

use crate::adapters;
use crate::output;
use thiserror::Error;

/// Problems a command reports to the user and then recovers from
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("'{0}' is not a supported adapter")]
    UnsupportedAdapter(String),

    #[error("Datasource '{0}' not found in datasources.yml")]
    DatasourceNotFound(String),

    #[error("'{0}' is a .strata setting and cannot hold credentials")]
    SettingKey(String),
}

impl CommandError {
    /// Print the error, plus the adapter list where that helps
    pub fn report(&self) {
        output::error(self);
        if let CommandError::UnsupportedAdapter(_) = self {
            eprintln!("Supported adapters: {}", supported_list());
        }
    }
}

pub(crate) fn supported_list() -> String {
    adapters::supported().collect::<Vec<_>>().join(", ")
}
