//! Command-line arguments

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ldx-cli")]
#[command(about = "Browse LDX Insight open datasets from the terminal")]
pub struct Args {
    /// API base address (overrides API_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Session cookie file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "20")]
    pub timeout: u64,

    /// Print raw JSON instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login(Credentials),
    /// Create an account and log in
    Register(Credentials),
    /// End the session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Dataset catalogue
    #[command(subcommand)]
    Datasets(DatasetsCommand),
    /// Platform statistics
    #[command(subcommand)]
    Stats(StatsCommand),
}

#[derive(ClapArgs, Debug)]
pub struct Credentials {
    /// Account name
    pub username: String,

    /// Password
    #[arg(long, env = "LDX_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum DatasetsCommand {
    /// Search datasets
    List {
        /// Match title or description
        #[arg(long, short = 'k')]
        keyword: Option<String>,

        /// Restrict to a category
        #[arg(long, short = 'c')]
        category: Option<String>,

        /// Zero-based page
        #[arg(long, default_value = "0")]
        page: u32,

        /// Page size
        #[arg(long, default_value = "10")]
        size: u32,

        /// Sort expression, e.g. viewCount,desc
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one dataset and count the view
    Show {
        /// Dataset id
        id: String,
    },
    /// List category names
    Categories,
    /// Export a dataset as CSV
    Download {
        /// Dataset id
        id: String,

        /// Directory to write into
        #[arg(long, short = 'o', default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum StatsCommand {
    /// Platform-wide counters
    Summary,
    /// Most viewed datasets
    TopViewed {
        #[arg(long, short = 'n')]
        limit: Option<u32>,
    },
    /// Most downloaded datasets
    TopDownloaded {
        #[arg(long, short = 'n')]
        limit: Option<u32>,
    },
    /// Dataset count per category
    ByCategory,
}

/// Check if `NO_COLOR` environment variable is set
pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok()
}
