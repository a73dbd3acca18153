//! Artifact directory configuration.

use std::env;
use std::path::{Path, PathBuf};

/// Storage environment configuration
#[derive(Debug, Clone)]
pub struct StorageEnvConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageEnvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl StorageEnvConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("QUANTA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
        }
    }

    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn price_dir(&self) -> PathBuf {
        self.data_dir.join("raw").join("sp500")
    }

    pub fn news_dir(&self) -> PathBuf {
        self.data_dir.join("raw").join("news")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_layout() {
        let config = StorageEnvConfig::with_data_dir("/tmp/q");
        assert_eq!(config.price_dir(), PathBuf::from("/tmp/q/raw/sp500"));
        assert_eq!(config.news_dir(), PathBuf::from("/tmp/q/raw/news"));
        assert_eq!(config.processed_dir(), PathBuf::from("/tmp/q/processed"));
    }
}
