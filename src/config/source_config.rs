//! Upstream source configuration parsing from environment variables.
//!
//! This module handles the endpoints and credentials of every external source:
//! - StockAnalysis (universe membership)
//! - Wikipedia (sector / founding metadata)
//! - Yahoo Finance (daily prices)
//! - Finnhub and RSS (market news)

use anyhow::{Context, Result};
use std::env;

/// Placeholder shipped in `.env.example`; treated as "no key".
pub const FINNHUB_KEY_PLACEHOLDER: &str = "YOUR_FINNHUB_API_KEY";

/// Finnhub API configuration
#[derive(Debug, Clone)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for FinnhubConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://finnhub.io/api/v1".to_string(),
        }
    }
}

impl FinnhubConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("FINNHUB_API_KEY").unwrap_or_default(),
            base_url: env::var("FINNHUB_BASE_URL")
                .unwrap_or_else(|_| "https://finnhub.io/api/v1".to_string()),
        }
    }

    /// A usable key is non-empty and not the placeholder.
    pub fn has_usable_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != FINNHUB_KEY_PLACEHOLDER
    }
}

/// Aggregated source configuration
#[derive(Debug, Clone)]
pub struct SourceEnvConfig {
    pub stockanalysis_url: String,
    pub wikipedia_url: String,
    pub yahoo_chart_url: String,
    pub finnhub: FinnhubConfig,
    pub news_rss_url: Option<String>,
    pub http_timeout_secs: u64,
    pub http_max_retries: u32,
}

impl Default for SourceEnvConfig {
    fn default() -> Self {
        Self {
            stockanalysis_url: "https://stockanalysis.com/list/sp-500-stocks/".to_string(),
            wikipedia_url: "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies"
                .to_string(),
            yahoo_chart_url: "https://query2.finance.yahoo.com/v8/finance/chart".to_string(),
            finnhub: FinnhubConfig::default(),
            news_rss_url: None,
            http_timeout_secs: 15,
            http_max_retries: 3,
        }
    }
}

impl SourceEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            stockanalysis_url: env::var("STOCKANALYSIS_SP500_URL")
                .unwrap_or(defaults.stockanalysis_url),
            wikipedia_url: env::var("WIKIPEDIA_SP500_URL").unwrap_or(defaults.wikipedia_url),
            yahoo_chart_url: env::var("YAHOO_CHART_URL").unwrap_or(defaults.yahoo_chart_url),
            finnhub: FinnhubConfig::from_env(),
            news_rss_url: env::var("NEWS_RSS_URL").ok().filter(|u| !u.trim().is_empty()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.http_timeout_secs.to_string())
                .parse::<u64>()
                .context("Failed to parse HTTP_TIMEOUT_SECS")?,
            http_max_retries: env::var("HTTP_MAX_RETRIES")
                .unwrap_or_else(|_| defaults.http_max_retries.to_string())
                .parse::<u32>()
                .context("Failed to parse HTTP_MAX_RETRIES")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_config_defaults() {
        let config = SourceEnvConfig::default();
        assert!(config.stockanalysis_url.contains("stockanalysis.com"));
        assert!(config.wikipedia_url.contains("wikipedia.org"));
        assert!(config.yahoo_chart_url.contains("finance.yahoo.com"));
        assert_eq!(config.http_timeout_secs, 15);
    }

    #[test]
    fn test_finnhub_placeholder_is_not_usable() {
        let mut config = FinnhubConfig::default();
        assert!(!config.has_usable_key());
        config.api_key = FINNHUB_KEY_PLACEHOLDER.to_string();
        assert!(!config.has_usable_key());
        config.api_key = "c0ffee".to_string();
        assert!(config.has_usable_key());
    }
}
