//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mscrape - declarative media crawler
#[derive(Parser)]
#[command(name = "mscrape")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Crawl a site described by a structure definition and download its media")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Crawl a site and download its media files
    #[command(alias = "r")]
    Run {
        /// Site definition file (TOML)
        site: PathBuf,
    },

    /// Show where a URL would land in the site structure, without fetching
    #[command(name = "check-url", alias = "check")]
    CheckUrl {
        /// Site definition file (TOML)
        site: PathBuf,

        /// URL to test against the structure
        url: String,
    },
}
