//! oxide-dbal CLI
//!
//! Prints the DDL a schema manager would issue, or runs it against a live
//! `PostgreSQL`/`MySQL` database when `--database` is given.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_dbal_core::prelude::*;
use oxide_dbal_core::StandardQuoter;
use oxide_dbal_sqlx::{Session, backend_for_url};

use commands::{Commands, Outcome};

/// Portable schema management for SQL databases.
#[derive(Parser)]
#[command(name = "oxide-dbal")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target backend (mysql, pgsql, oci8, ibase, fbsql).
    #[arg(short, long, env = "OXIDE_DBAL_BACKEND")]
    backend: Option<Backend>,

    /// JSON file with manager options.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Database URL. Without it statements are printed, not executed.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Quote identifiers in generated DDL.
    #[arg(long)]
    quote_identifiers: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Builds manager options from the config file and the flags.
    fn manager_options(&self) -> anyhow::Result<ManagerOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config '{}'", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Failed to parse config '{}'", path.display()))?
            }
            None => ManagerOptions::default(),
        };

        let url_backend = match self.database.as_deref() {
            Some(url) => match backend_for_url(url) {
                Some(backend) => Some(backend),
                None => bail!("Unsupported database URL '{url}': expected postgres:// or mysql://"),
            },
            None => None,
        };
        match (self.backend, url_backend) {
            (Some(flag), Some(url)) if flag != url => {
                bail!("--backend {flag} does not match the database URL, which is {url}")
            }
            (Some(backend), _) | (None, Some(backend)) => options.backend = backend,
            (None, None) => {}
        }
        if self.quote_identifiers {
            options.quote_identifiers = true;
        }
        options.validate()?;
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout carries the generated SQL
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = cli.manager_options()?;
    if let Some(lines) = commands::describe(&options, &cli.command)? {
        print_lines(&lines);
        return Ok(());
    }

    match cli.database {
        Some(url) => {
            let session = Session::connect(&url)
                .await?
                .quote_identifiers(options.quote_identifiers);
            info!(backend = %session.backend(), "Connected");
            let mut manager = SchemaManager::new(session, options)?;
            match commands::execute(&mut manager, cli.command).await? {
                Outcome::Applied => info!("Done."),
                Outcome::Names(names) => print_lines(&names),
                Outcome::Planned(statements) => print_statements(&statements),
            }
            manager.into_connection().close().await?;
        }
        None => {
            let quoter = script_quoter(&options);
            let mut manager = SchemaManager::new(ScriptConnection::new(quoter), options)?;
            let outcome = commands::execute(&mut manager, cli.command).await?;
            let script = manager.into_connection();
            match outcome {
                Outcome::Applied => print_statements(script.statements()),
                Outcome::Names(_) => print_statements(script.queries()),
                Outcome::Planned(statements) => print_statements(&statements),
            }
        }
    }

    Ok(())
}

fn script_quoter(options: &ManagerOptions) -> StandardQuoter {
    options
        .backend
        .dialect(options.datatype_options())
        .quoter(options.quote_identifiers)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Prints statements as a script, one `;`-terminated statement each.
fn print_statements(statements: &[String]) {
    for sql in statements {
        if sql.ends_with(';') {
            println!("{sql}");
        } else {
            println!("{sql};");
        }
    }
}
