//! Tool requests and the scraping service behind every tool
//!
//! A [`UrlRequest`] carries either `url` or `urls`; [`UrlRequest::into_batch`]
//! turns both shapes into one ordered URL list plus resolved
//! [`FetchOptions`], so the batch layer never sees the difference.

use crate::batch::run_batch;
use crate::config::{seconds, Defaults, ScraperConfig};
use crate::envelope::ResultEnvelope;
use crate::extract::{extract, ExtractionKind};
use crate::fetch::{FetchClient, FetchOptions, ScrapingBeeClient};
use reqwest::header::{HeaderName, HeaderValue};
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use url::Url;

/// Input shared by every tool
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UrlRequest {
    /// Single URL to process
    #[serde(default)]
    pub url: Option<String>,
    /// List of URLs to process (results keep this order)
    #[serde(default)]
    pub urls: Option<Vec<String>>,
    /// Custom user agent string
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Whether to render JavaScript before returning the page
    #[serde(default)]
    pub render_js: Option<bool>,
    /// Timeout per URL in seconds
    #[serde(default)]
    pub timeout: Option<f64>,
    /// Additional headers to send to the target site
    #[serde(default)]
    pub custom_headers: Option<BTreeMap<String, String>>,
}

/// A request rejected before any URL is fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Either 'url' or 'urls' must be provided")]
    MissingUrl,
    #[error("Cannot provide both 'url' and 'urls'")]
    BothUrlForms,
    #[error("'urls' must contain at least one URL")]
    EmptyBatch,
    #[error("URL must start with http:// or https://: {0}")]
    InvalidUrl(String),
    #[error("Timeout must be a positive number of seconds")]
    InvalidTimeout,
    #[error("Invalid custom header: {0}")]
    InvalidHeader(String),
}

/// Validated request: ordered URLs sharing one set of options
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub urls: Vec<String>,
    pub options: FetchOptions,
}

impl UrlRequest {
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn batch<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: Some(urls.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Validate and normalize, filling unset options from `defaults`
    pub fn into_batch(self, defaults: &Defaults) -> Result<Batch, RequestError> {
        let urls = match (self.url, self.urls) {
            (Some(_), Some(_)) => return Err(RequestError::BothUrlForms),
            (None, None) => return Err(RequestError::MissingUrl),
            (Some(url), None) => vec![url],
            (None, Some(urls)) if urls.is_empty() => return Err(RequestError::EmptyBatch),
            (None, Some(urls)) => urls,
        };

        let urls = urls
            .into_iter()
            .map(|url| validate_url(url.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        let timeout = match self.timeout {
            Some(secs) => seconds(secs).map_err(|_| RequestError::InvalidTimeout)?,
            None => defaults.timeout,
        };

        let headers = self.custom_headers.unwrap_or_default();
        for (name, value) in &headers {
            validate_header(name, value)?;
        }

        let user_agent = self
            .user_agent
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(|| defaults.user_agent.clone());

        Ok(Batch {
            urls,
            options: FetchOptions {
                user_agent,
                render_js: self.render_js.unwrap_or(false),
                timeout,
                headers,
            },
        })
    }
}

fn validate_url(url: &str) -> Result<String, RequestError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(url.to_string())
        }
        _ => Err(RequestError::InvalidUrl(url.to_string())),
    }
}

fn validate_header(name: &str, value: &str) -> Result<(), RequestError> {
    if HeaderName::from_bytes(name.as_bytes()).is_err() {
        return Err(RequestError::InvalidHeader(format!("bad name '{}'", name)));
    }
    if HeaderValue::from_str(value).is_err() {
        return Err(RequestError::InvalidHeader(format!("bad value for '{}'", name)));
    }
    Ok(())
}

/// Fetch-and-extract service shared by all tools
pub struct Scraper {
    client: Arc<dyn FetchClient>,
    defaults: Defaults,
}

impl Scraper {
    pub fn new(client: Arc<dyn FetchClient>, defaults: Defaults) -> Self {
        Self { client, defaults }
    }

    /// Build the ScrapingBee-backed service from process configuration
    pub fn from_config(config: &ScraperConfig) -> anyhow::Result<Self> {
        let api_key = config.require_api_key()?;
        let client = ScrapingBeeClient::new(api_key, &config.base_url)?;
        Ok(Self::new(Arc::new(client), config.defaults()?))
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Run one extraction over every URL in the request.
    ///
    /// Only a malformed request fails as a whole; per-URL faults are reported
    /// inside the returned envelopes.
    pub async fn run(
        &self,
        kind: ExtractionKind,
        request: UrlRequest,
    ) -> Result<Vec<ResultEnvelope>, RequestError> {
        let batch = request.into_batch(&self.defaults)?;
        info!(tool = kind.tool_name(), urls = batch.urls.len(), "Processing request");

        let client = &self.client;
        let options = &batch.options;
        let results = run_batch(&batch.urls, self.defaults.concurrency, |url| async move {
            let html = client.fetch(&url, options).await?;
            extract(&html, kind)
        })
        .await;

        Ok(results)
    }
}
