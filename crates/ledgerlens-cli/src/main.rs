//! LedgerLens CLI - Financial record analysis
//!
//! Usage:
//!   ledgerlens init                              Initialize database
//!   ledgerlens datasets create "Q1 books"        Create a dataset
//!   ledgerlens import --dataset 1 --file q1.csv  Import records
//!   ledgerlens analyze --dataset 1 --kind risk   Run a narrative analysis
//!   ledgerlens serve --port 3000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt).await,
        Commands::Datasets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_datasets_list(&db, &cli.user, 0, 100),
                Some(DatasetsAction::List { skip, limit }) => {
                    commands::cmd_datasets_list(&db, &cli.user, skip, limit)
                }
                Some(DatasetsAction::Create { name, description }) => {
                    commands::cmd_datasets_create(&db, &cli.user, &name, description)
                        .map(|_| ())
                }
                Some(DatasetsAction::Delete { id }) => {
                    commands::cmd_datasets_delete(&db, &cli.user, id)
                }
            }
        }
        Commands::Import { dataset, file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &cli.user, dataset, &file).map(|_| ())
        }
        Commands::Records {
            dataset,
            record_type,
            category,
            window,
            limit,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_records(
                &db,
                &cli.user,
                dataset,
                record_type.as_deref(),
                category,
                &window,
                limit,
            )
            .map(|_| ())
        }
        Commands::Summary { dataset, window } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, &cli.user, dataset, &window)
        }
        Commands::Revenue { dataset, window } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_revenue(&db, &cli.user, dataset, &window)
        }
        Commands::Expenses { dataset, window } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_expenses(&db, &cli.user, dataset, &window)
        }
        Commands::Profit { dataset, window } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_profit(&db, &cli.user, dataset, &window)
        }
        Commands::Analyze {
            dataset,
            kind,
            prompt,
            focus,
            window,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let ai = ledgerlens_core::AIClient::from_env();
            commands::cmd_analyze(&db, ai, &cli.user, dataset, &kind, prompt, focus, &window)
                .await
                .map(|_| ())
        }
        Commands::History {
            dataset,
            kind,
            limit,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_history(&db, &cli.user, dataset, kind.as_deref(), limit).map(|_| ())
        }
    }
}
