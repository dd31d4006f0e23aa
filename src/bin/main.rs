//! Schemata CLI - Inspect a Postgres schema and resolve query definitions
//!
//! Usage:
//!   schemata inspect [--schema <name>] [--database-url <url> | --snapshot <file>]
//!   schemata resolve --queries <file> [--schema <name>] [...]
//!   schemata check --queries <file> [...]
//!   schemata snapshot [--output <file>] [...]
//!
//! Examples:
//!   schemata inspect --database-url postgres://localhost/app
//!   schemata resolve --queries queries.toml --snapshot catalog.json
//!   schemata snapshot --schema billing --output catalog.json

use clap::{Args, Parser, Subcommand};
use schemata::catalog::{CatalogInspector, MemoryCatalog, PgInspector};
use schemata::config::Settings;
use schemata::generate::{self, GenerateOptions};
use schemata::query::QueryDefinitions;
use sqlx::postgres::PgPoolOptions;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schemata")]
#[command(about = "Schemata - Postgres schema introspection for typed data-access code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema model (tables, columns, enums, types) as JSON
    Inspect {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Resolve query definitions and print the full generation as JSON
    Resolve {
        #[command(flatten)]
        source: SourceArgs,

        /// Path to the query definitions file
        #[arg(short, long)]
        queries: Option<PathBuf>,
    },

    /// Validate query definitions against the schema without printing it
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Path to the query definitions file
        #[arg(short, long)]
        queries: Option<PathBuf>,
    },

    /// Save the catalog as a JSON snapshot for offline runs
    Snapshot {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Path to the config file (default: schemata.toml lookup)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Schema to inspect
    #[arg(short, long)]
    schema: Option<String>,

    /// Read the catalog from a JSON snapshot instead of a database
    #[arg(long, conflicts_with = "database_url")]
    snapshot: Option<PathBuf>,

    /// Postgres URL (overrides [connection] url)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Inspect { source } => cmd_inspect(source).await,
        Commands::Resolve { source, queries } => cmd_resolve(source, queries).await,
        Commands::Check { source, queries } => cmd_check(source, queries).await,
        Commands::Snapshot { source, output } => cmd_snapshot(source, output).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so JSON on stdout stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_inspect(source: SourceArgs) -> Result<(), String> {
    let settings = load_settings(&source)?;
    let inspector = open_inspector(&source, &settings).await?;
    let options = GenerateOptions::default().with_schema(&settings.schema);

    let (schema, types) = generate::inspect(inspector.as_ref(), &options)
        .await
        .map_err(|e| e.to_string())?;

    let output = serde_json::json!({
        "schema": schema,
        "types": types,
    });
    print_json(&output)
}

async fn cmd_resolve(source: SourceArgs, queries: Option<PathBuf>) -> Result<(), String> {
    let settings = load_settings(&source)?;
    let definitions = load_definitions(queries.as_deref().or(settings.queries.as_deref()))?;
    let inspector = open_inspector(&source, &settings).await?;
    let options = GenerateOptions::default().with_schema(&settings.schema);

    let generation = generate::generate(inspector.as_ref(), &definitions, options)
        .await
        .map_err(|e| e.to_string())?;

    print_json(&generation)
}

async fn cmd_check(source: SourceArgs, queries: Option<PathBuf>) -> Result<(), String> {
    let settings = load_settings(&source)?;
    let definitions = load_definitions(queries.as_deref().or(settings.queries.as_deref()))?;
    let inspector = open_inspector(&source, &settings).await?;
    let options = GenerateOptions::default().with_schema(&settings.schema);

    let generation = generate::generate(inspector.as_ref(), &definitions, options)
        .await
        .map_err(|e| e.to_string())?;

    println!(
        "OK: schema '{}' has {} table(s), {} enum(s); {} query(s) resolved",
        generation.schema,
        generation.tables.len(),
        generation.enums.len(),
        generation.queries.len()
    );
    for query in &generation.queries {
        println!(
            "  - {} on {} ({:?})",
            query.exported_name(),
            query.table.name,
            query.cardinality()
        );
    }
    Ok(())
}

async fn cmd_snapshot(source: SourceArgs, output: Option<PathBuf>) -> Result<(), String> {
    let settings = load_settings(&source)?;
    let inspector = open_inspector(&source, &settings).await?;

    let catalog = MemoryCatalog::capture(inspector.as_ref(), &settings.schema)
        .await
        .map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&catalog).map_err(|e| e.to_string())?;

    match output {
        Some(path) => {
            fs::write(&path, json).map_err(|e| format!("writing '{}': {}", path.display(), e))
        }
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

/// Config file values, with command-line flags taking precedence.
fn load_settings(source: &SourceArgs) -> Result<Settings, String> {
    let mut settings = match &source.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
    .map_err(|e| e.to_string())?;

    if let Some(schema) = &source.schema {
        settings.schema = schema.clone();
    }
    if let Some(url) = &source.database_url {
        settings.connection.url = Some(url.clone());
    }
    settings.validate().map_err(|e| e.to_string())?;

    debug!(schema = %settings.schema, "settings loaded");
    Ok(settings)
}

fn load_definitions(path: Option<&Path>) -> Result<QueryDefinitions, String> {
    let Some(path) = path else {
        debug!("no query definitions configured; only primary-key lookups will be generated");
        return Ok(QueryDefinitions::default());
    };

    let source = fs::read_to_string(path)
        .map_err(|e| format!("reading '{}': {}", path.display(), e))?;
    QueryDefinitions::from_toml(&source)
        .map_err(|e| format!("parsing '{}': {}", path.display(), e))
}

async fn open_inspector(
    source: &SourceArgs,
    settings: &Settings,
) -> Result<Box<dyn CatalogInspector>, String> {
    if let Some(path) = &source.snapshot {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("reading '{}': {}", path.display(), e))?;
        let catalog = MemoryCatalog::from_json(&json)
            .map_err(|e| format!("parsing '{}': {}", path.display(), e))?;
        return Ok(Box::new(catalog));
    }

    let url = settings.connection.resolved_url().map_err(|e| e.to_string())?;
    let pool = PgPoolOptions::new()
        .max_connections(settings.connection.max_connections)
        .connect(&url)
        .await
        .map_err(|e| format!("connecting to database: {}", e))?;
    Ok(Box::new(PgInspector::new(pool)))
}
