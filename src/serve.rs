//! serve command: MCP server over stdio exposing the scraping tools

use crate::config::ScraperConfig;
use crate::extract::ExtractionKind;
use crate::tools::{Scraper, UrlRequest};
use anyhow::{Context, Result};
use clap::Args;
use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServiceExt,
};
use std::sync::Arc;
use tracing::info;

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ScraperConfig,
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let scraper = Scraper::from_config(&args.config)?;
    info!(
        concurrency = scraper.defaults().concurrency,
        timeout_secs = scraper.defaults().timeout.as_secs_f64(),
        "Starting web scraping MCP server on stdio"
    );

    let running = ScrapeServer::new(scraper)
        .serve(stdio())
        .await
        .map_err(|e| anyhow::anyhow!("MCP initialization failed: {}", e))?;

    running.waiting().await.context("MCP server task failed")?;
    info!("MCP server stopped");

    Ok(())
}

/// MCP handler: one tool per extraction kind
#[derive(Clone)]
pub struct ScrapeServer {
    scraper: Arc<Scraper>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ScrapeServer {
    pub fn new(scraper: Scraper) -> Self {
        Self {
            scraper: Arc::new(scraper),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Fetch raw HTML content from a URL (`url`) or a batch of URLs (`urls`)")]
    async fn fetch_html(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ExtractionKind::Html, request).await
    }

    #[tool(description = "Extract the page title from the <title> tag of each URL")]
    async fn extract_page_title(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ExtractionKind::Title, request).await
    }

    #[tool(description = "Extract the meta description of each URL")]
    async fn extract_meta_description(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ExtractionKind::MetaDescription, request).await
    }

    #[tool(description = "Extract Open Graph (og:*) metadata of each URL")]
    async fn extract_open_graph_metadata(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ExtractionKind::OpenGraph, request).await
    }

    #[tool(description = "Extract the text of all H1 headers of each URL")]
    async fn extract_h1_headers(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ExtractionKind::H1, request).await
    }

    #[tool(description = "Extract the text of all H2 headers of each URL")]
    async fn extract_h2_headers(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ExtractionKind::H2, request).await
    }

    #[tool(description = "Extract the text of all H3 headers of each URL")]
    async fn extract_h3_headers(
        &self,
        Parameters(request): Parameters<UrlRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.call(ExtractionKind::H3, request).await
    }
}

impl ScrapeServer {
    /// Run a tool and return its envelopes as a JSON array
    pub async fn call(
        &self,
        kind: ExtractionKind,
        request: UrlRequest,
    ) -> Result<CallToolResult, McpError> {
        let envelopes = self
            .scraper
            .run(kind, request)
            .await
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let payload = serde_json::to_string(&envelopes)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(payload)]))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for ScrapeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Web scraping tools. Every tool accepts `url` or `urls` (plus optional user_agent, render_js, timeout, custom_headers) and returns one result per URL, in input order."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
