//! Configuration module for Quanta.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Sources, Storage, and Pipeline.

mod pipeline_config;
mod source_config;
mod storage_config;

pub use pipeline_config::PipelineEnvConfig;
pub use source_config::{FINNHUB_KEY_PLACEHOLDER, FinnhubConfig, SourceEnvConfig};
pub use storage_config::StorageEnvConfig;

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub sources: SourceEnvConfig,
    pub storage: StorageEnvConfig,
    pub pipeline: PipelineEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            sources: SourceEnvConfig::from_env().context("Failed to load source config")?,
            storage: StorageEnvConfig::from_env(),
            pipeline: PipelineEnvConfig::from_env().context("Failed to load pipeline config")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_layout() {
        let config = Config::default();
        assert!(config.storage.price_dir().ends_with("raw/sp500"));
        assert_eq!(config.pipeline.price_fetch_concurrency, 8);
        assert!(!config.sources.finnhub.has_usable_key());
    }
}
