use crate::domain::errors::IngestError;
use crate::domain::news::NewsArticle;
use crate::domain::ports::NewsProvider;
use std::sync::Arc;
use tracing::{info, warn};

/// Category-scoped news retrieval through an injected provider.
///
/// A missing provider is `ProviderUnavailable`; a working provider with no
/// articles is `Ok(vec![])`.
pub struct NewsIngester {
    provider: Result<Arc<dyn NewsProvider>, IngestError>,
}

impl NewsIngester {
    pub fn new(provider: Arc<dyn NewsProvider>) -> Self {
        Self {
            provider: Ok(provider),
        }
    }

    /// An ingester whose provider could not be built; every fetch returns `reason`.
    pub fn unavailable(reason: IngestError) -> Self {
        Self {
            provider: Err(reason),
        }
    }

    pub async fn fetch(&self, category: &str) -> Result<Vec<NewsArticle>, IngestError> {
        let provider = match &self.provider {
            Ok(provider) => provider,
            Err(reason) => {
                warn!("News provider unavailable: {}", reason);
                return Err(reason.clone());
            }
        };

        let articles = provider.market_news(category).await?;
        if articles.is_empty() {
            info!("{} returned no '{}' news", provider.name(), category);
        } else {
            info!(
                "Fetched {} '{}' articles from {}",
                articles.len(),
                category,
                provider.name()
            );
        }
        Ok(articles)
    }
}
