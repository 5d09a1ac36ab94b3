//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Owner recorded on datasets created from the command line
pub const DEFAULT_USER: &str = "local@ledgerlens";

/// LedgerLens - Financial data analysis with narrative insights
#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(about = "Self-hosted financial record analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "ledgerlens.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set LEDGERLENS_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Identity that owns datasets and analyses
    #[arg(long, default_value = DEFAULT_USER, global = true)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inclusive date window shared by the report commands
#[derive(Args, Debug, Clone, Default)]
pub struct DateWindow {
    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage datasets (list, create, delete)
    Datasets {
        #[command(subcommand)]
        action: Option<DatasetsAction>,
    },

    /// Import financial records from a CSV or Excel file into a dataset
    Import {
        /// Dataset to import into
        #[arg(short, long)]
        dataset: i64,

        /// .csv, .xlsx or .xls file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List records in a dataset, newest first
    Records {
        #[arg(short, long)]
        dataset: i64,

        /// Record type: revenue, expense, asset, liability, equity
        #[arg(short = 't', long = "type")]
        record_type: Option<String>,

        /// Exact category match
        #[arg(short, long)]
        category: Option<String>,

        #[command(flatten)]
        window: DateWindow,

        /// Maximum number of records to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show summary statistics for a dataset
    Summary {
        #[arg(short, long)]
        dataset: i64,

        #[command(flatten)]
        window: DateWindow,
    },

    /// Show revenue by category and daily revenue trend
    Revenue {
        #[arg(short, long)]
        dataset: i64,

        #[command(flatten)]
        window: DateWindow,
    },

    /// Show expenses by category and daily expense trend
    Expenses {
        #[arg(short, long)]
        dataset: i64,

        #[command(flatten)]
        window: DateWindow,
    },

    /// Show the daily profit timeline
    Profit {
        #[arg(short, long)]
        dataset: i64,

        #[command(flatten)]
        window: DateWindow,
    },

    /// Run a narrative analysis
    Analyze {
        #[arg(short, long)]
        dataset: i64,

        /// Analysis kind: trend, health, comparative, risk, forecast, custom
        #[arg(short, long, default_value = "trend")]
        kind: String,

        /// Question for custom analyses, extra context for the others
        #[arg(short, long)]
        prompt: Option<String>,

        /// Categories to focus on (comma-separated)
        #[arg(long, value_delimiter = ',')]
        focus: Option<Vec<String>>,

        #[command(flatten)]
        window: DateWindow,
    },

    /// Show past analyses
    History {
        /// Only analyses of this dataset
        #[arg(short, long)]
        dataset: Option<i64>,

        /// Only analyses of this kind
        #[arg(short, long)]
        kind: Option<String>,

        #[arg(short, long, default_value = "50")]
        limit: i64,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, every /api request needs a key from LEDGERLENS_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
pub enum DatasetsAction {
    /// List datasets, newest first
    List {
        /// Number of datasets to skip
        #[arg(long, default_value = "0")]
        skip: i64,

        #[arg(short, long, default_value = "100")]
        limit: i64,
    },

    /// Create an empty dataset
    Create {
        /// Dataset name
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Delete a dataset with its records and analyses
    Delete {
        /// Dataset ID
        id: i64,
    },
}
