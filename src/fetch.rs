//! Fetching pages through the ScrapingBee API
//!
//! [`FetchClient`] is the seam between the batch layer and the network; the
//! production implementation is [`ScrapingBeeClient`]. Every failure comes
//! back as a [`Fault`] carrying a status code, a timeout, or a transport
//! error, never the API key.

use crate::error::Fault;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://app.scrapingbee.com/api/v1/";

/// Backend-side timeout bounds accepted by ScrapingBee, in milliseconds
const MIN_BACKEND_TIMEOUT_MS: u128 = 1_000;
const MAX_BACKEND_TIMEOUT_MS: u128 = 140_000;

/// Longest error body kept in a fault message
const MAX_MESSAGE_CHARS: usize = 300;

/// Resolved per-request fetch options
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    pub user_agent: String,
    pub render_js: bool,
    pub timeout: Duration,
    /// Extra headers forwarded to the target site
    pub headers: BTreeMap<String, String>,
}

/// Fetch raw HTML for a URL
#[async_trait]
pub trait FetchClient: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, Fault>;
}

/// ScrapingBee HTML API client
pub struct ScrapingBeeClient {
    http: Client,
    api_key: String,
    base_url: Url,
}

impl ScrapingBeeClient {
    pub fn new(api_key: impl Into<String>, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("Invalid ScrapingBee base URL '{}': {}", base_url, e))?;
        let http = Client::builder()
            .user_agent(concat!("scrape-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url,
        })
    }

    fn build_request(&self, url: &str, options: &FetchOptions) -> RequestBuilder {
        let backend_timeout = options
            .timeout
            .as_millis()
            .clamp(MIN_BACKEND_TIMEOUT_MS, MAX_BACKEND_TIMEOUT_MS)
            .to_string();

        let mut request = self
            .http
            .get(self.base_url.clone())
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("url", url),
                ("render_js", if options.render_js { "true" } else { "false" }),
                ("timeout", backend_timeout.as_str()),
                ("forward_headers", "true"),
            ])
            .header("Spb-User-Agent", options.user_agent.as_str());

        for (name, value) in &options.headers {
            request = request.header(format!("Spb-{}", name), value.as_str());
        }

        request
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, Fault> {
        let response = request.send().await.map_err(transport_fault)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Fault::Status {
                status: status.as_u16(),
                message: error_message(&body, status),
            });
        }

        response.text().await.map_err(transport_fault)
    }
}

#[async_trait]
impl FetchClient for ScrapingBeeClient {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String, Fault> {
        debug!(url, render_js = options.render_js, "Fetching HTML");

        let request = self.build_request(url, options);
        match tokio::time::timeout(options.timeout, self.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(Fault::Timeout(format!(
                "no response within {:.1}s",
                options.timeout.as_secs_f64()
            ))),
        }
    }
}

/// Map a reqwest error to a fault, dropping the request URL (it holds the API key)
fn transport_fault(err: reqwest::Error) -> Fault {
    let is_timeout = err.is_timeout();
    let is_transport = err.is_connect() || err.is_request() || err.is_body() || err.is_decode();
    let message = error_chain(&err.without_url());

    if is_timeout {
        Fault::Timeout(message)
    } else if is_transport {
        Fault::Network(message)
    } else {
        Fault::Other(message)
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Human-readable message from a ScrapingBee error body
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error", "reason"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
        });

    let message = from_json.unwrap_or_else(|| body.trim().to_string());
    if message.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string();
    }
    truncate(&message, MAX_MESSAGE_CHARS)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{}...", cut)
    }
}
