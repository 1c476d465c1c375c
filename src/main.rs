//! Query Guard CLI - validate and run analytical queries

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use query_guard::error::{FixSuggestion, GuardError};
use query_guard::remote::{HttpQueryExecutor, QueryExecutor, StaticQueryExecutor};
use query_guard::validator::{load_document, load_request};
use query_guard::validators::{parse_query_value, validate_shape};
use query_guard::{GuardConfig, QueryValidator};

#[derive(Parser)]
#[command(name = "query-guard")]
#[command(about = "Query Guard - validate analytical queries before they run")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the structure of a query (no network)
    Validate {
        /// Query or request file (.json, .yaml, .yml)
        file: PathBuf,
    },

    /// Check structure and filter values against live data
    Check {
        /// Request file (.json, .yaml, .yml)
        file: PathBuf,

        /// Offline value fixture: {"caption": [values]}
        #[arg(long)]
        values: Option<PathBuf>,

        /// Config file (default: ~/.config/query-guard/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate, then execute and print the result
    Run {
        /// Request file (.json, .yaml, .yml)
        file: PathBuf,

        /// Config file (default: ~/.config/query-guard/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so `run` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = match cli.command {
        Commands::Validate { file } => validate_file(&file),
        Commands::Check {
            file,
            values,
            config,
        } => check_file(&file, values.as_deref(), config.as_deref(), &cancel).await,
        Commands::Run { file, config } => run_file(&file, config.as_deref(), &cancel).await,
    };

    if let Err(e) = result {
        report_error(&e);
        std::process::exit(1);
    }
}

fn validate_file(file: &Path) -> anyhow::Result<()> {
    let document = load_document(file)?;

    // Accept a bare query or a full request
    let document = match document {
        serde_json::Value::Object(mut map) if map.contains_key("query") => {
            map.remove("query").unwrap_or_default()
        }
        other => other,
    };

    let query = parse_query_value(document).map_err(GuardError::from)?;
    validate_shape(&query).map_err(GuardError::from)?;

    println!("{} Query '{}' is valid", "✓".green(), file.display());
    println!("  Fields: {}", query.fields.len());
    println!("  Filters: {}", query.filters.len());

    Ok(())
}

async fn check_file(
    file: &Path,
    values: Option<&Path>,
    config_path: Option<&Path>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let request = load_request(file)?;
    let config = load_config(config_path)?;

    let executor: Arc<dyn QueryExecutor> = match values {
        Some(path) => {
            let fixture = load_document(path)?;
            Arc::new(
                StaticQueryExecutor::from_json(&fixture)
                    .with_context(|| format!("Invalid value fixture {:?}", path))?,
            )
        }
        None => Arc::new(HttpQueryExecutor::from_config(&config.server)?),
    };

    println!(
        "{} Checking '{}' against {}",
        "→".cyan(),
        file.display(),
        executor.name().cyan().bold()
    );

    let validator = QueryValidator::new(config, executor);
    let report = validator.check(&request, cancel).await?;

    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }

    report.into_result()?;

    println!("{} Query '{}' is valid", "✓".green(), file.display());
    Ok(())
}

async fn run_file(
    file: &Path,
    config_path: Option<&Path>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let request = load_request(file)?;
    let config = load_config(config_path)?;
    let executor = Arc::new(HttpQueryExecutor::from_config(&config.server)?);

    let validator = QueryValidator::new(config, executor);
    let output = validator.execute_checked(&request, cancel).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GuardConfig, GuardError> {
    let config = match path {
        Some(path) => GuardConfig::load_from(path)?,
        None => GuardConfig::load()?,
    };
    Ok(config.with_env())
}

fn report_error(err: &anyhow::Error) {
    let guard = err.downcast_ref::<GuardError>();

    match guard {
        Some(GuardError::Structural(structural)) => {
            eprintln!(
                "{} [{}] Invalid query",
                "Error:".red().bold(),
                guard.map(GuardError::code).unwrap_or_default()
            );
            for issue in &structural.issues {
                eprintln!("  {} {}", "-".red(), issue);
            }
        }
        Some(GuardError::FilterValidation { errors }) => {
            eprintln!(
                "{} [QG-010] {} filter(s) reference values missing from the data",
                "Error:".red().bold(),
                errors.len()
            );
            for error in errors {
                eprintln!("  {} {}", "-".red(), error.message);
            }
        }
        _ => eprintln!("{} {:#}", "Error:".red().bold(), err),
    }

    if let Some(suggestion) = guard.and_then(|g| g.fix_suggestion()) {
        eprintln!("  {} {}", "Fix:".yellow(), suggestion);
    }
}
