//! Pipeline parameters: history start, lookback, fan-out width, persistence.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

/// Pipeline environment configuration
#[derive(Debug, Clone)]
pub struct PipelineEnvConfig {
    pub price_start_date: NaiveDate,
    pub news_category: String,
    pub lookback_days: i64,
    pub price_fetch_concurrency: usize,
    pub price_auto_adjust: bool,
    pub persist_artifacts: bool,
    pub sector_rules_path: Option<PathBuf>,
}

impl Default for PipelineEnvConfig {
    fn default() -> Self {
        Self {
            price_start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            news_category: "general".to_string(),
            lookback_days: 365,
            price_fetch_concurrency: 8,
            price_auto_adjust: true,
            persist_artifacts: false,
            sector_rules_path: None,
        }
    }
}

impl PipelineEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let price_start_date = match env::var("PRICE_START_DATE") {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .context("Failed to parse PRICE_START_DATE (expected YYYY-MM-DD)")?,
            Err(_) => defaults.price_start_date,
        };

        let price_fetch_concurrency = Self::parse_usize(
            "PRICE_FETCH_CONCURRENCY",
            defaults.price_fetch_concurrency,
        )?;
        if price_fetch_concurrency == 0 {
            anyhow::bail!("PRICE_FETCH_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            price_start_date,
            news_category: env::var("NEWS_CATEGORY").unwrap_or(defaults.news_category),
            lookback_days: env::var("LOOKBACK_DAYS")
                .unwrap_or_else(|_| defaults.lookback_days.to_string())
                .parse::<i64>()
                .context("Failed to parse LOOKBACK_DAYS")?,
            price_fetch_concurrency,
            price_auto_adjust: Self::parse_bool("PRICE_AUTO_ADJUST", defaults.price_auto_adjust)?,
            persist_artifacts: Self::parse_bool("PERSIST_ARTIFACTS", defaults.persist_artifacts)?,
            sector_rules_path: env::var("SECTOR_RULES_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_bool(key: &str, default: bool) -> Result<bool> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .to_lowercase()
            .parse::<bool>()
            .context(format!("Failed to parse {}", key))
    }
}
