use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use strata_config::ConfigStore;

mod adapters;
mod commands;
mod connector;
mod credentials;
mod guard;
mod logging;
mod output;
mod prompt;

use connector::{Scope, TableFilter, UnavailableConnectors};

/// Strata command line client.
///
/// Manages Strata projects and the datasources they connect to. Settings are
/// layered: built-in defaults, then the global file, then the project's
/// `.strata` file.
///
/// EXAMPLES:
///     strata init analytics -d postgres     Create a project
///     strata ds add snowflake               Add a datasource entry
///     strata ds auth snowflake              Store its credentials
///     strata ds test snowflake              Check the connection
///
/// ENVIRONMENT VARIABLES:
///     XDG_CONFIG_HOME   Directory holding the global .strata file
///     STRATA_LOG        Log filter (overrides log_level, e.g. 'debug')
///     NO_COLOR          Set to disable colored output
#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the client version
    Version,

    /// List supported datasource adapters
    Adapters,

    /// Create a new Strata project
    ///
    /// The project directory is a url-safe form of NAME. One datasource entry
    /// is scaffolded per --datasource flag (snowflake when none is given).
    ///
    /// EXAMPLES:
    ///     strata init "Sales Analytics"
    ///     strata init analytics -d postgres -d duckdb
    Init {
        /// Project name
        name: String,
        /// Adapter to scaffold a datasource for (repeatable)
        #[arg(long = "datasource", short = 'd')]
        datasources: Vec<String>,
        /// Skip git repository initialization
        #[arg(long)]
        no_git: bool,
        /// Verbose output
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Manage datasources
    #[command(subcommand)]
    #[command(visible_alias = "datasource")]
    Ds(DsCommands),
}

#[derive(Subcommand)]
enum DsCommands {
    /// List supported datasource adapters
    Adapters,

    /// List configured datasources
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a datasource entry to datasources.yml
    ///
    /// EXAMPLES:
    ///     strata ds add postgres
    ///     strata ds add snowflake --key finance
    Add {
        /// Adapter kind
        adapter: String,
        /// Identifier to store the entry under (defaults to the adapter)
        #[arg(long, short = 'k')]
        key: Option<String>,
    },

    /// Prompt for credentials and store them in the project .strata file
    Auth {
        /// Datasource identifier
        ds_key: String,
        /// Store credentials on the Strata server instead
        #[arg(long)]
        remote: bool,
    },

    /// Test the connection to a datasource
    Test {
        /// Datasource identifier
        ds_key: String,
    },

    /// List tables of a datasource
    Tables {
        /// Datasource identifier
        ds_key: String,
        /// Only tables matching this pattern
        #[arg(long, short = 'p')]
        pattern: Option<String>,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Show column metadata of a table
    Meta {
        /// Datasource identifier
        ds_key: String,
        /// Table name
        table: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Execute a query against a datasource
    ///
    /// EXAMPLES:
    ///     strata ds exec warehouse --query "select 1"
    ///     strata ds exec warehouse --file queries/daily.sql
    Exec {
        /// Datasource identifier
        ds_key: String,
        /// SQL text
        #[arg(long, short = 'q', conflicts_with = "file", required_unless_present = "file")]
        query: Option<String>,
        /// File containing the SQL
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
    },
}

/// Overrides of the configured database, catalog and schema
#[derive(Args, Debug, Clone, Default)]
struct ScopeArgs {
    /// Database to use instead of the configured one
    #[arg(long)]
    database: Option<String>,
    /// Catalog to use instead of the configured one
    #[arg(long)]
    catalog: Option<String>,
    /// Schema to use instead of the configured one
    #[arg(long)]
    schema: Option<String>,
}

impl From<ScopeArgs> for Scope {
    fn from(args: ScopeArgs) -> Self {
        Scope {
            database: args.database,
            catalog: args.catalog,
            schema: args.schema,
        }
    }
}

impl Commands {
    /// Name used by the project guard
    fn name(&self) -> &'static str {
        match self {
            Commands::Version => "version",
            Commands::Adapters => "adapters",
            Commands::Init { .. } => "init",
            Commands::Ds(ds) => match ds {
                DsCommands::Adapters => "ds adapters",
                DsCommands::List { .. } => "ds list",
                DsCommands::Add { .. } => "ds add",
                DsCommands::Auth { .. } => "ds auth",
                DsCommands::Test { .. } => "ds test",
                DsCommands::Tables { .. } => "ds tables",
                DsCommands::Meta { .. } => "ds meta",
                DsCommands::Exec { .. } => "ds exec",
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log = logging::init();
    let cwd = std::env::current_dir()?;

    if let Err(e) = guard::check(cli.command.name(), &cwd) {
        eprintln!("{} {}", "ERROR:".red().bold(), e);
        std::process::exit(1);
    }

    let mut store = ConfigStore::load(&cwd)?;
    log.apply_configured(store.log_level());
    tracing::debug!(
        command = cli.command.name(),
        project = store.is_project(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Version => {
            println!("strata {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Adapters | Commands::Ds(DsCommands::Adapters) => {
            commands::datasource::adapters();
        }
        Commands::Init {
            name,
            datasources,
            no_git,
            verbose,
        } => {
            let args = commands::init::InitArgs {
                name,
                datasources,
                git: !no_git,
                path: cwd,
                verbose,
            };
            commands::init::run(args)?;
        }
        Commands::Ds(command) => run_ds(command, &mut store)?,
    }

    Ok(())
}

fn run_ds(command: DsCommands, store: &mut ConfigStore) -> Result<()> {
    let connectors = UnavailableConnectors;

    match command {
        DsCommands::Adapters => commands::datasource::adapters(),
        DsCommands::List { json } => commands::datasource::list(store.project_dir(), json)?,
        DsCommands::Add { adapter, key } => {
            let args = commands::datasource::AddArgs {
                adapter,
                key,
                project_dir: store.project_dir().to_path_buf(),
            };
            commands::datasource::add(args)?;
        }
        DsCommands::Auth { ds_key, remote } => {
            let mut prompt = prompt::TerminalPrompt;
            commands::datasource::auth(store, &ds_key, remote, &mut prompt)?;
        }
        DsCommands::Test { ds_key } => commands::query::test(store, &connectors, &ds_key)?,
        DsCommands::Tables {
            ds_key,
            pattern,
            scope,
        } => {
            let filter = TableFilter {
                pattern,
                scope: scope.into(),
            };
            commands::query::tables(store, &connectors, &ds_key, &filter)?;
        }
        DsCommands::Meta {
            ds_key,
            table,
            scope,
        } => {
            commands::query::meta(store, &connectors, &ds_key, &table, &scope.into())?;
        }
        DsCommands::Exec {
            ds_key,
            query,
            file,
        } => {
            let source = match (query, file) {
                (Some(sql), _) => commands::query::QuerySource::Inline(sql),
                (None, Some(path)) => commands::query::QuerySource::File(path),
                (None, None) => anyhow::bail!("Either --query or --file is required"),
            };
            commands::query::exec(store, &connectors, &ds_key, &source)?;
        }
    }
    Ok(())
}
