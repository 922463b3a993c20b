//! sqlsandbox command-line front end
//!
//! Loads a JSON dataset and runs one statement, or a file of statements, against it.
//! Every outcome is printed as JSON on stdout; query failures are outcomes too.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use sqlsandbox::{Catalog, QueryConfig, QueryExecutor, QueryOutcome};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[clap(name = "sqlsandbox-cli", version)]
struct Arguments {
    /// Dataset file: `{"<table>": {"schema": [...], "rows": [...]}}`
    #[clap(long, short)]
    data: PathBuf,

    /// Fail on WHERE conditions that cannot be parsed instead of ignoring them.
    #[clap(long)]
    strict: bool,

    /// Engine configuration file (JSON).
    #[clap(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[clap(long)]
    pretty: bool,

    /// File of `;`-separated statements, executed in parallel.
    #[clap(long, short, conflicts_with = "query")]
    file: Option<PathBuf>,

    /// Statement to execute.
    query: Option<String>,
}

fn main() -> Result<()> {
    let args = Arguments::parse();

    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            QueryConfig::from_json_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => QueryConfig::default(),
    };
    if args.strict {
        config = config.with_predicate_mode(sqlsandbox::PredicateMode::Strict);
    }

    let catalog = Catalog::load(&args.data)
        .with_context(|| format!("failed to load dataset {}", args.data.display()))?;
    tracing::debug!(tables = ?catalog.list_tables(), "dataset loaded");

    let executor = QueryExecutor::new(config);

    let outcomes: Vec<QueryOutcome> = match (&args.query, &args.file) {
        (Some(query), None) => vec![executor.execute(query, &catalog)],
        (None, Some(path)) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            // par_iter + collect keeps input order
            split_statements(&text)
                .par_iter()
                .map(|statement| executor.execute(statement, &catalog))
                .collect()
        }
        _ => bail!("pass either a statement or --file"),
    };

    let mut stdout = BufWriter::new(io::stdout());
    for outcome in &outcomes {
        if args.pretty {
            serde_json::to_writer_pretty(&mut stdout, outcome)?;
        } else {
            serde_json::to_writer(&mut stdout, outcome)?;
        }
        writeln!(stdout)?;
    }
    stdout.flush()?;

    Ok(())
}

/// Split on `;` outside quoted strings, dropping empty statements
fn split_statements(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        match (quote, ch) {
            (None, ';') => {
                statements.push(std::mem::take(&mut current));
                continue;
            }
            (None, '\'' | '"') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
        current.push(ch);
    }
    statements.push(current);

    statements
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
