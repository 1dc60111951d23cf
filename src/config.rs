//! Process configuration from flags and environment variables

use crate::fetch::DEFAULT_BASE_URL;
use anyhow::{bail, Result};
use clap::Args;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; WebScrapingMCPServer/1.0)";

/// Scraping backend and default request settings
#[derive(Args, Debug, Clone)]
pub struct ScraperConfig {
    /// ScrapingBee API key
    #[arg(long, env = "SCRAPINGBEE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// ScrapingBee API endpoint
    #[arg(long, env = "SCRAPINGBEE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Maximum simultaneous fetches per batch (1-100)
    #[arg(long, env = "DEFAULT_CONCURRENCY", default_value = "5", value_parser = clap::value_parser!(u16).range(1..=100))]
    pub concurrency: u16,

    /// Default timeout per URL in seconds
    #[arg(long, env = "DEFAULT_TIMEOUT", default_value = "90")]
    pub default_timeout: f64,

    /// User agent used when a request does not set one
    #[arg(long, env = "DEFAULT_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub default_user_agent: String,
}

/// Immutable defaults applied to every request
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout: Duration::from_secs(90),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScraperConfig {
    /// The API key, or an error naming the variable to set
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => bail!(
                "SCRAPINGBEE_API_KEY is required. Set it as an environment variable or pass --api-key."
            ),
        }
    }

    pub fn defaults(&self) -> Result<Defaults> {
        Ok(Defaults {
            concurrency: usize::from(self.concurrency),
            timeout: seconds(self.default_timeout)?,
            user_agent: self.default_user_agent.clone(),
        })
    }
}

/// Convert a positive, finite number of seconds to a duration
pub fn seconds(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        bail!("Timeout must be a positive number of seconds, got {}", secs);
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|_| anyhow::anyhow!("Timeout of {} seconds is too large", secs))
}
