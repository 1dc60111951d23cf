//! scrape-mcp: web scraping tools over MCP
//!
//! Modules:
//! - batch: bounded-concurrency, order-preserving batch execution
//! - error: fault taxonomy and classification
//! - envelope: per-URL success/failure records
//! - extract: title, meta description, Open Graph, header extraction
//! - fetch: ScrapingBee client
//! - tools: request normalization and the scraping service
//! - serve / scrape: CLI commands

pub mod batch;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod scrape;
pub mod serve;
pub mod tools;

pub use batch::run_batch;
pub use envelope::{ErrorBody, Outcome, ResultEnvelope};
pub use error::{classify, ErrorKind, Fault};
pub use extract::{extract, ExtractionKind};
pub use fetch::{FetchClient, FetchOptions, ScrapingBeeClient};
pub use tools::{Batch, RequestError, Scraper, UrlRequest};
