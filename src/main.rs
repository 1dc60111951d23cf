//! scrape-mcp CLI
//!
//! Web scraping tools backed by ScrapingBee, served over MCP (stdio) or run
//! once from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};

use scrape_mcp::logging::init_logging;
use scrape_mcp::scrape::{run_scrape, ScrapeArgs};
use scrape_mcp::serve::{run_serve, ServeArgs};

#[derive(Parser)]
#[command(name = "scrape-mcp")]
#[command(version)]
#[command(about = "Web scraping tools over MCP, backed by ScrapingBee")]
#[command(long_about = "Fetch HTML and extract titles, meta descriptions, Open Graph data and headers.\n\nCommands:\n  serve    Run the MCP server on stdio\n  scrape   Run one extraction over URLs and print the results")]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio
    Serve(ServeArgs),
    /// Scrape URLs once and print one result per URL
    Scrape(ScrapeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Scrape(args) => run_scrape(args).await,
    }
}
