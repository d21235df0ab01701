//! guac-import - reconcile a CSV of connections into Apache Guacamole
//!
//! Settings are layered, later sources winning:
//!
//! 1. `~/.guacamole-import/config.json` (or `--config <file>`)
//! 2. `GUACAMOLE_*` environment variables, including a `.env` file
//! 3. Command-line flags
//!
//! The process exits non-zero on fatal errors (configuration, unreadable CSV,
//! authentication, snapshot load) and when a non-empty input imported nothing.
//!
//! # Usage
//!
//! ```bash
//! guac-import connections.csv -u http://localhost:8080/guacamole/api -n guacadmin -p guacadmin
//! RUST_LOG=guacamole_import_core=debug guac-import connections.csv --print-tree
//! ```

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use guacamole_import_core::{
    input, GuacamoleClient, ImportService, ImportSettings, RemoteHierarchy,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{default_level},reqwest=warn,hyper=warn"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("guac-import {}", env!("CARGO_PKG_VERSION"));

    let file_settings = match &cli.config {
        Some(path) => ImportSettings::from_file(path)?,
        None => ImportSettings::load_default()?,
    };
    let (guacamole, importer) = file_settings
        .merge(cli.settings())
        .resolve()
        .context("Incomplete configuration (see --help for the required settings)")?;

    let parsed = input::read_rows(&cli.csv_file)?;
    if !parsed.skipped.is_empty() {
        tracing::warn!(
            "{} rows skipped while reading {}",
            parsed.skipped.len(),
            cli.csv_file.display()
        );
    }

    tracing::info!("Importing into {}", guacamole.base_url());
    let client: Arc<dyn RemoteHierarchy> = Arc::new(GuacamoleClient::new(guacamole)?);
    let mut service = ImportService::new(client, importer);
    let outcome = service.run(parsed.rows).await?;

    if cli.print_tree {
        println!("{}", outcome.tree.render());
    }

    let summary = &outcome.summary;
    for failure in &summary.failures {
        eprintln!(
            "  row {} ({} / {}): {}",
            failure.row, failure.site, failure.name, failure.error
        );
    }
    println!(
        "Imported {}/{} connections ({} groups created, {} connections created, {} already present)",
        summary.succeeded,
        summary.total,
        summary.groups_created,
        summary.leaves_created,
        summary.leaves_existing
    );

    if summary.nothing_imported() {
        tracing::error!("Failed to import any connections");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
