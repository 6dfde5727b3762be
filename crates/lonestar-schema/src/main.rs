//! Lonestar Schema Registry administrative CLI
//!
//! Operates on a file-backed schema store. Exit code 0 on success,
//! non-zero with the failure reason printed otherwise.
//!
//! ## Usage
//!
//! ```bash
//! # Load seed files into a store
//! lonestar-schema seed --store /var/lib/lonestar/schemas summary-seeds.json
//!
//! # Verify a document compiles before pushing it
//! lonestar-schema check summary-0.9.38.json
//!
//! # Re-fetch and recompile a pushed document
//! lonestar-schema reload --store /var/lib/lonestar/schemas --kind summary --version 0.9.38
//!
//! # One-shot sample validation
//! lonestar-schema validate --store /var/lib/lonestar/schemas \
//!     --kind summary --version 0.9.38 --metric cpu.user --value 42.0
//! ```

use clap::{Parser, Subcommand};
use lonestar_schema::{
    compiler, Decision, FileStore, RawSchemaDocument, SampleValue, SchemaKind, SchemaRegistry,
    SchemaStore, Seeder, ValidationGateway,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "lonestar-schema")]
#[command(
    author,
    version,
    about = "Lonestar metric-schema registry - administrative tooling"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Load seed files into a schema store
    Seed {
        /// Store root directory
        #[arg(short, long)]
        store: PathBuf,

        /// Seed files (JSON, one entry or an array of entries each)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compile a raw schema document file and report defects
    Check {
        /// Document file path
        file: PathBuf,
    },

    /// Print a stored document
    Get {
        /// Store root directory
        #[arg(short, long)]
        store: PathBuf,

        /// Schema kind (summary, timeseries)
        #[arg(short, long)]
        kind: SchemaKind,

        /// Schema version
        #[arg(long)]
        version: String,
    },

    /// List stored versions for a kind
    Versions {
        /// Store root directory
        #[arg(short, long)]
        store: PathBuf,

        /// Schema kind (summary, timeseries)
        #[arg(short, long)]
        kind: SchemaKind,
    },

    /// Fetch and recompile a document from the store
    Reload {
        /// Store root directory
        #[arg(short, long)]
        store: PathBuf,

        /// Schema kind (summary, timeseries)
        #[arg(short, long)]
        kind: SchemaKind,

        /// Schema version
        #[arg(long)]
        version: String,
    },

    /// Validate one sample against a stored schema
    Validate {
        /// Store root directory
        #[arg(short, long)]
        store: PathBuf,

        /// Schema kind (summary, timeseries)
        #[arg(short, long)]
        kind: SchemaKind,

        /// Schema version
        #[arg(long)]
        version: String,

        /// Concrete metric path, e.g. net.eth0.rx_bytes
        #[arg(short, long)]
        metric: String,

        /// Sample value; parsed as a number unless --text is given
        #[arg(long)]
        value: String,

        /// Treat the value as a text payload
        #[arg(long, default_value = "false")]
        text: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Seed { store, files } => seed(store, files).await,
        Commands::Check { file } => check(file).await,
        Commands::Get {
            store,
            kind,
            version,
        } => get(store, kind, &version).await,
        Commands::Versions { store, kind } => versions(store, kind).await,
        Commands::Reload {
            store,
            kind,
            version,
        } => reload(store, kind, &version).await,
        Commands::Validate {
            store,
            kind,
            version,
            metric,
            value,
            text,
        } => validate(store, kind, &version, &metric, &value, text).await,
    }
}

fn open_store(root: PathBuf) -> anyhow::Result<Arc<FileStore>> {
    Ok(Arc::new(FileStore::new(root)?))
}

async fn seed(store: PathBuf, files: Vec<PathBuf>) -> anyhow::Result<()> {
    let seeder = Seeder::new(open_store(store)?);

    let mut total = 0;
    for file in &files {
        let report = seeder.seed_file(file).await?;
        info!(file = %file.display(), documents = report.documents(), "seed file loaded");
        for key in &report.stored {
            println!("  upserted {}", key);
        }
        total += report.documents();
    }
    println!("✓ Seeded {} document(s) from {} file(s)", total, files.len());
    Ok(())
}

async fn check(file: PathBuf) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(&file).await?;
    let raw: RawSchemaDocument = serde_json::from_str(&content)?;

    match compiler::compile(&raw) {
        Ok(document) => {
            println!(
                "✓ {} compiles: {} descriptor(s)",
                document.key(),
                document.len()
            );
            Ok(())
        }
        Err(e) => anyhow::bail!("{} does not compile: {}", file.display(), e),
    }
}

async fn get(store: PathBuf, kind: SchemaKind, version: &str) -> anyhow::Result<()> {
    let store = open_store(store)?;
    match store.fetch(kind, version).await? {
        Some(document) => {
            println!("{}", serde_json::to_string_pretty(&document)?);
            Ok(())
        }
        None => anyhow::bail!("no {} document for version {}", kind, version),
    }
}

async fn versions(store: PathBuf, kind: SchemaKind) -> anyhow::Result<()> {
    let store = open_store(store)?;
    let versions = store.versions(kind).await?;
    println!("{} versions ({}):", kind, versions.len());
    for version in versions {
        println!("  - {}", version);
    }
    Ok(())
}

async fn reload(store: PathBuf, kind: SchemaKind, version: &str) -> anyhow::Result<()> {
    let registry = SchemaRegistry::with_store(open_store(store)?);
    match registry.reload(kind, version).await {
        Ok(document) => {
            println!("✓ Reloaded {}: {} descriptor(s)", document.key(), document.len());
            Ok(())
        }
        Err(e) => anyhow::bail!("reload failed: {}", e),
    }
}

async fn validate(
    store: PathBuf,
    kind: SchemaKind,
    version: &str,
    metric: &str,
    value: &str,
    text: bool,
) -> anyhow::Result<()> {
    let sample = if text {
        SampleValue::from(value)
    } else {
        let number: f64 = value
            .parse()
            .map_err(|_| anyhow::anyhow!("'{}' is not a number; use --text for text payloads", value))?;
        SampleValue::Number(number)
    };

    let registry = Arc::new(SchemaRegistry::with_store(open_store(store)?));
    let gateway = ValidationGateway::new(registry);

    let decision = gateway.validate(kind, version, metric, &sample).await?;
    match decision {
        Decision::Accepted => {
            println!("✓ Accepted: {} = {}", metric, value);
            Ok(())
        }
        Decision::Rejected { reason } => {
            anyhow::bail!("✗ Rejected: {} ({})", metric, reason)
        }
    }
}
