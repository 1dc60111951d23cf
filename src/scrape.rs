//! scrape command: run one extraction from the command line
//!
//! Same request handling as the MCP tools, output printed to stdout as a JSON
//! (or YAML) array of result envelopes.

use crate::config::ScraperConfig;
use crate::extract::ExtractionKind;
use crate::tools::{Scraper, UrlRequest};
use anyhow::{Context, Result};
use clap::Args;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::LazyLock;
use tokio::fs;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s\)>\]"'`]+"#).expect("URL pattern is a valid regex")
});

#[derive(Args)]
pub struct ScrapeArgs {
    /// What to extract from each page
    #[arg(value_enum)]
    pub kind: ExtractionKind,

    /// URLs to scrape (multiple allowed, order is kept)
    pub urls: Vec<String>,

    /// Markdown or text file to read URLs from
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Read URLs from stdin (one per line)
    #[arg(long)]
    pub stdin: bool,

    /// Render JavaScript before extracting
    #[arg(long)]
    pub render_js: bool,

    /// Custom user agent for this run
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Extra header sent to the target site (NAME:VALUE, repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Timeout per URL in seconds (overrides --default-timeout)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Output format: json (default) or yaml
    #[arg(long, short, default_value = "json")]
    pub format: String,

    #[command(flatten)]
    pub config: ScraperConfig,
}

pub async fn run_scrape(args: ScrapeArgs) -> Result<()> {
    let urls = get_urls(&args).await?;

    if urls.is_empty() {
        eprintln!("No URLs found.");
        std::process::exit(1);
    }

    let scraper = Scraper::from_config(&args.config)?;

    let request = UrlRequest {
        urls: Some(urls),
        user_agent: args.user_agent.clone(),
        render_js: Some(args.render_js),
        timeout: args.timeout,
        custom_headers: if args.headers.is_empty() {
            None
        } else {
            Some(args.headers.iter().cloned().collect::<BTreeMap<_, _>>())
        },
        ..UrlRequest::default()
    };

    let results = scraper.run(args.kind, request).await?;

    let output = match args.format.as_str() {
        "yaml" | "yml" => serde_yaml::to_string(&results)?,
        _ => serde_json::to_string_pretty(&results)?,
    };
    println!("{}", output);

    let ok = results.iter().filter(|r| r.is_success()).count();
    eprintln!("Done: {}/{} OK", ok, results.len());

    Ok(())
}

/// URLs from arguments, --file, and --stdin, in that order
async fn get_urls(args: &ScrapeArgs) -> Result<Vec<String>> {
    let mut urls = args.urls.clone();

    if let Some(file) = &args.file {
        let content = fs::read_to_string(file)
            .await
            .with_context(|| format!("Failed to read file: {}", file.display()))?;
        urls.extend(extract_urls(&content));
    }

    if args.stdin {
        let stdin = io::stdin();
        urls.extend(
            stdin
                .lock()
                .lines()
                .map_while(Result::ok)
                .map(|line| line.trim().to_string())
                .filter(|line| line.starts_with("http")),
        );
    }

    if urls.is_empty() && args.file.is_none() && !args.stdin {
        eprintln!("Usage:");
        eprintln!("  scrape-mcp scrape <KIND> <URL>...          Scrape URLs");
        eprintln!("  scrape-mcp scrape <KIND> --file <file.md>  Scrape URLs found in a file");
        eprintln!("  scrape-mcp scrape <KIND> --stdin           Read URLs from stdin");
        std::process::exit(1);
    }

    Ok(urls)
}

/// URLs found in text, in document order (duplicates kept)
pub fn extract_urls(content: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(content)
        .map(|m| {
            m.as_str()
                .trim_end_matches(|c| matches!(c, ',' | '.' | ')' | ']' | ';' | ':'))
                .to_string()
        })
        .collect()
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{}'", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
