use crate::application::news_ingester::NewsIngester;
use crate::application::price_fetcher::PriceSeriesFetcher;
use crate::domain::artifact::ArtifactKind;
use crate::domain::errors::SnapshotError;
use crate::domain::market::PricePanel;
use crate::domain::news::LabeledArticle;
use crate::domain::sentiment::PolarityScorer;
use crate::infrastructure::persistence::ArtifactStore;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct NewsSnapshot {
    pub articles: Vec<LabeledArticle>,
    pub artifact: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    pub panel: PricePanel,
    pub artifact: Option<PathBuf>,
}

/// Fetches fresh news or prices and saves them only when asked to.
pub struct MarketSnapshotService {
    news: NewsIngester,
    prices: PriceSeriesFetcher,
    scorer: Arc<dyn PolarityScorer>,
    store: ArtifactStore,
}

impl MarketSnapshotService {
    pub fn new(
        news: NewsIngester,
        prices: PriceSeriesFetcher,
        scorer: Arc<dyn PolarityScorer>,
        store: ArtifactStore,
    ) -> Self {
        Self {
            news,
            prices,
            scorer,
            store,
        }
    }

    /// Fetch a news category and label each article from its headline.
    pub async fn refresh_news(
        &self,
        category: &str,
        persist: bool,
    ) -> Result<NewsSnapshot, SnapshotError> {
        let articles: Vec<LabeledArticle> = self
            .news
            .fetch(category)
            .await?
            .into_iter()
            .map(|article| {
                let sentiment = self.scorer.classify(&article.headline);
                LabeledArticle { article, sentiment }
            })
            .collect();

        // An empty file would shadow older news for the aligner
        let artifact = if !persist {
            None
        } else if articles.is_empty() {
            warn!("No '{}' news returned; nothing saved", category);
            None
        } else {
            Some(
                self.store
                    .save_timestamped(articles.as_slice(), &ArtifactKind::News)?,
            )
        };

        Ok(NewsSnapshot { articles, artifact })
    }

    /// Fetch the price panel; `None` tickers means the whole universe.
    pub async fn refresh_prices(
        &self,
        tickers: Option<&[String]>,
        start: NaiveDate,
        persist: bool,
    ) -> Result<PriceSnapshot, SnapshotError> {
        let panel = self.prices.fetch(tickers, start).await?;

        let artifact = if persist {
            Some(self.store.save_timestamped(&panel, &ArtifactKind::Prices)?)
        } else {
            info!("Price snapshot not persisted");
            None
        };

        Ok(PriceSnapshot { panel, artifact })
    }
}
