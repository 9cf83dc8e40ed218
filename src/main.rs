use clap::{Args, Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tablekv::config::{ConfigError, LogFormat, LoggingConfig, StoreConfig};
use tablekv::kv::{Database, Datastore, Digest, KvError, RawObject, sha256};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("KV store error: {0}")]
    Kv(#[from] KvError),

    #[error("Invalid digest '{0}': {1}")]
    InvalidDigest(String, hex::FromHexError),

    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("--digest requires --versioned")]
    DigestWithoutVersioned,
}

#[derive(Parser)]
#[command(name = "tablekv")]
#[command(about = "Inspect and edit tables and versioned tables in a tablekv store")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "TABLEKV_CONFIG")]
    config: Option<PathBuf>,

    /// Backend URL (overrides the config file), e.g. fjall:///var/lib/app
    #[arg(long, global = true, env = "TABLEKV_URL")]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Location of a table.
#[derive(Args)]
struct TableArgs {
    /// Name of the database
    db: String,

    /// Name of the table
    table: String,

    /// Address a versioned table (SHA-256 digests)
    #[arg(long)]
    versioned: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a record; fails if the id exists
    Create {
        #[command(flatten)]
        table: TableArgs,

        /// Record id
        id: String,

        /// Record value
        value: String,
    },

    /// Print a record
    Get {
        #[command(flatten)]
        table: TableArgs,

        /// Record id
        id: String,

        /// Read this stored version instead of the current one (hex)
        #[arg(long)]
        digest: Option<String>,
    },

    /// Replace a record; fails if the id does not exist
    Update {
        #[command(flatten)]
        table: TableArgs,

        /// Record id
        id: String,

        /// New record value
        value: String,
    },

    /// Delete a record (versioned: drop the reference, keep the history)
    Delete {
        #[command(flatten)]
        table: TableArgs,

        /// Record id
        id: String,
    },

    /// List records whose id starts with a prefix
    List {
        #[command(flatten)]
        table: TableArgs,

        /// Only records whose id starts with this prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Print current digests instead of values (versioned only)
        #[arg(long)]
        refs: bool,
    },
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StoreConfig::from_file(path)?,
        None => StoreConfig::default(),
    };
    if let Some(url) = cli.url {
        config.url = url;
    }
    init_logging(&config.logging)?;

    let store = Datastore::open_with_config(&config)?;

    match cli.command {
        Commands::Create { table, id, value } => {
            let db = store.db(&table.db)?;
            let obj = RawObject::new(value);
            if table.versioned {
                let digest = versioned(&db, &table)?.create(id.as_bytes(), &obj)?;
                println!("{digest}");
            } else {
                db.table::<RawObject>(&table.table)?
                    .create(id.as_bytes(), &obj)?;
            }
        }

        Commands::Get { table, id, digest } => {
            let db = store.db(&table.db)?;
            match (table.versioned, digest) {
                (true, Some(hex)) => {
                    let digest = Digest::from_hex(&hex)
                        .map_err(|e| AppError::InvalidDigest(hex.clone(), e))?;
                    let obj = versioned(&db, &table)?.get_version(id.as_bytes(), &digest)?;
                    print_value(&obj);
                }
                (true, None) => {
                    let (obj, digest) = versioned(&db, &table)?.get(id.as_bytes())?;
                    eprintln!("digest: {digest}");
                    print_value(&obj);
                }
                (false, Some(_)) => return Err(AppError::DigestWithoutVersioned),
                (false, None) => {
                    let obj = db.table::<RawObject>(&table.table)?.get(id.as_bytes())?;
                    print_value(&obj);
                }
            }
        }

        Commands::Update { table, id, value } => {
            let db = store.db(&table.db)?;
            let obj = RawObject::new(value);
            if table.versioned {
                let digest = versioned(&db, &table)?.update(id.as_bytes(), &obj)?;
                println!("{digest}");
            } else {
                db.table::<RawObject>(&table.table)?
                    .update(id.as_bytes(), &obj)?;
            }
        }

        Commands::Delete { table, id } => {
            let db = store.db(&table.db)?;
            if table.versioned {
                let digest = versioned(&db, &table)?.delete(id.as_bytes())?;
                println!("{digest}");
            } else {
                db.table::<RawObject>(&table.table)?.delete(id.as_bytes())?;
            }
        }

        Commands::List {
            table,
            prefix,
            refs,
        } => {
            let db = store.db(&table.db)?;
            let start = prefix.as_bytes();
            if table.versioned && refs {
                versioned(&db, &table)?.iter_ref(start, |digest| {
                    println!("{digest}");
                    Ok::<(), AppError>(())
                })?;
            } else if table.versioned {
                versioned(&db, &table)?.iter(start, |obj| {
                    print_value(&obj);
                    Ok::<(), AppError>(())
                })?;
            } else {
                db.table::<RawObject>(&table.table)?.iter(start, |obj| {
                    print_value(&obj);
                    Ok::<(), AppError>(())
                })?;
            }
        }
    }

    Ok(())
}

fn versioned(
    db: &Database,
    table: &TableArgs,
) -> Result<tablekv::kv::VersionedTable<RawObject>, AppError> {
    Ok(db.versioned_table(&table.table, sha256())?)
}

fn print_value(obj: &RawObject) {
    println!("{}", String::from_utf8_lossy(obj.as_bytes()));
}

/// Install a tracing subscriber per `config`.
fn init_logging(config: &LoggingConfig) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_new(&config.level).map_err(|e| AppError::InvalidFilter(e.to_string()))?;
    let registry = tracing_subscriber::registry().with(filter);

    match (config.format, config.output.as_str()) {
        (LogFormat::Text, "stdout") => registry
            .with(fmt::layer().with_ansi(io::stdout().is_terminal()).with_writer(io::stdout))
            .init(),
        (LogFormat::Text, "stderr") => registry
            .with(fmt::layer().with_ansi(io::stderr().is_terminal()).with_writer(io::stderr))
            .init(),
        (LogFormat::Json, "stdout") => registry
            .with(fmt::layer().json().with_writer(io::stdout))
            .init(),
        (LogFormat::Json, "stderr") => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init(),
        (format, path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            match format {
                LogFormat::Text => registry
                    .with(fmt::layer().with_ansi(false).with_writer(file))
                    .init(),
                LogFormat::Json => registry.with(fmt::layer().json().with_writer(file)).init(),
            }
        }
    }

    Ok(())
}
