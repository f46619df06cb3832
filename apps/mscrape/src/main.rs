//! mscrape - declarative media crawler
//!
//! The CLI wires together the config, site, and engine crates: it loads
//! the site definition, runs the crawl with live progress display, and
//! renders the final report.

mod cli;
mod display;
mod error;
mod events;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use mscrape_config::Config;
use mscrape_engine::{CrawlReport, Crawler};
use mscrape_events::EventReceiver;
use mscrape_site::SiteConfig;
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting mscrape v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_or_default(cli.global.config.as_deref()).await?;
    let renderer = OutputRenderer::new(cli.global.json);

    match cli.command {
        Commands::Run { site } => {
            let site = load_site(&site).await?;
            let (tx, rx) = mscrape_events::channel();
            let crawler = Crawler::new(site, config, tx)?;

            let mut handler = EventHandler::new(cli.global.json, cli.global.debug);
            let report = crawl_with_events(&crawler, rx, &mut handler).await?;
            renderer.render_report(&report);
        }
        Commands::CheckUrl { site, url } => {
            let site = load_site(&site).await?;
            let candidates = site.simulate(&url)?;
            renderer.render_simulation(&url, &candidates);
        }
    }

    info!("Command completed successfully");
    Ok(())
}

async fn load_site(path: &Path) -> Result<SiteConfig, CliError> {
    SiteConfig::load(path).await.map_err(CliError::from)
}

/// Run the crawl while draining events concurrently
async fn crawl_with_events(
    crawler: &Crawler,
    mut rx: EventReceiver,
    handler: &mut EventHandler,
) -> Result<CrawlReport, CliError> {
    let mut crawl = Box::pin(crawler.run());

    loop {
        select! {
            result = &mut crawl => {
                // Drain any remaining events
                while let Ok(event) = rx.try_recv() {
                    handler.handle_event(event);
                }
                return result.map_err(CliError::from);
            }

            event = rx.recv() => {
                if let Some(event) = event {
                    handler.handle_event(event);
                }
                // Channel closed: keep waiting for the crawl to finish
            }
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if json_mode {
        // Suppress console logging to avoid contaminating JSON output
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,mscrape=debug")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .init();
    }
}
