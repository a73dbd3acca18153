use super::series::{pct_change, rolling_mean, rolling_std, shift_back};
use crate::application::sector_mapper::SectorSentimentMapper;
use crate::config::StorageEnvConfig;
use crate::domain::artifact::ArtifactKind;
use crate::domain::errors::{DatasetError, IngestError, StorageError};
use crate::domain::features::{FeatureDataset, FeatureRow};
use crate::domain::market::PricePanel;
use crate::domain::news::NewsArticle;
use crate::domain::universe::normalize_symbol;
use crate::infrastructure::persistence::{ArtifactStore, LatestArtifactCache, news_csv, price_csv};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

const VOL_WINDOW: usize = 20;
const VOL_MIN_PERIODS: usize = 10;

/// Per-date sentiment aggregates.
#[derive(Debug, Clone, Copy)]
struct DailySentiment {
    mean: f64,
    rolling_3d: Option<f64>,
    rolling_7d: Option<f64>,
}

/// Result of `build_all`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub unavailable: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// A malformed artifact is a layout problem, not an I/O one.
fn classify(e: StorageError) -> DatasetError {
    match e {
        StorageError::Malformed { path, reason } => DatasetError::Schema {
            artifact: path,
            reason,
        },
        other => DatasetError::Storage(other),
    }
}

/// Joins price and news artifacts into labeled training rows.
pub struct FeatureAligner {
    cache: LatestArtifactCache,
    store: ArtifactStore,
    mapper: Arc<SectorSentimentMapper>,
    persist: bool,
}

impl FeatureAligner {
    pub fn new(storage: StorageEnvConfig, mapper: Arc<SectorSentimentMapper>) -> Self {
        Self {
            cache: LatestArtifactCache::new(storage.clone()),
            store: ArtifactStore::new(storage),
            mapper,
            persist: false,
        }
    }

    /// Write each built dataset under `data/processed`.
    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    fn not_found(&self, kind: &ArtifactKind) -> IngestError {
        IngestError::ArtifactNotFound {
            directory: self.store.directory_for(kind),
            pattern: kind.pattern(),
        }
    }

    fn load_panel(&self) -> Result<Option<PricePanel>, DatasetError> {
        let Some(path) = self.cache.resolve(&ArtifactKind::Prices)? else {
            warn!("{}; dataset unavailable", self.not_found(&ArtifactKind::Prices));
            return Ok(None);
        };
        debug!("Using price artifact {:?}", path);
        price_csv::read_panel(&path).map(Some).map_err(classify)
    }

    fn load_news(&self) -> Result<Option<Vec<NewsArticle>>, DatasetError> {
        let Some(path) = self.cache.resolve(&ArtifactKind::News)? else {
            warn!("{}; dataset unavailable", self.not_found(&ArtifactKind::News));
            return Ok(None);
        };
        debug!("Using news artifact {:?}", path);
        news_csv::read_articles(&path).map(Some).map_err(classify)
    }

    pub fn build(
        &self,
        ticker: &str,
        lookback_days: i64,
    ) -> Result<Option<FeatureDataset>, DatasetError> {
        self.build_at(ticker, lookback_days, Local::now().naive_local())
    }

    /// `build` with an explicit clock.
    ///
    /// `Ok(None)` means the dataset is unavailable: a missing artifact, a
    /// ticker absent from the price panel, or nothing left after the join.
    /// `Err` means an artifact exists but cannot be read as expected.
    pub fn build_at(
        &self,
        ticker: &str,
        lookback_days: i64,
        now: NaiveDateTime,
    ) -> Result<Option<FeatureDataset>, DatasetError> {
        let Some(panel) = self.load_panel()? else {
            return Ok(None);
        };
        let Some(articles) = self.load_news()? else {
            return Ok(None);
        };

        let Some(mut dataset) = self.align(ticker, &panel, &articles, lookback_days, now) else {
            return Ok(None);
        };

        // A failed save keeps the rows; only the artifact path is lost
        if self.persist {
            match self.save(&dataset) {
                Ok(path) => dataset.artifact = Some(path),
                Err(e) => warn!("Failed to save dataset for {}: {}", dataset.ticker, e),
            }
        }
        Ok(Some(dataset))
    }

    /// Build every ticker of the latest price artifact, one after another.
    pub fn build_all(&self, lookback_days: i64) -> Result<BatchSummary, DatasetError> {
        self.build_all_at(lookback_days, Local::now().naive_local())
    }

    pub fn build_all_at(
        &self,
        lookback_days: i64,
        now: NaiveDateTime,
    ) -> Result<BatchSummary, DatasetError> {
        let Some(panel) = self.load_panel()? else {
            return Ok(BatchSummary::default());
        };
        let tickers: Vec<String> = panel
            .tickers()
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();

        let mut summary = BatchSummary {
            total: tickers.len(),
            ..BatchSummary::default()
        };

        let Some(articles) = self.load_news()? else {
            summary.unavailable = tickers;
            return Ok(summary);
        };

        for ticker in tickers {
            match self.align(&ticker, &panel, &articles, lookback_days, now) {
                None => summary.unavailable.push(ticker),
                Some(dataset) if self.persist => match self.save(&dataset) {
                    Ok(_) => summary.succeeded += 1,
                    Err(e) => {
                        warn!("Failed to save dataset for {}: {}", ticker, e);
                        summary.failed.push((ticker, e.to_string()));
                    }
                },
                Some(_) => summary.succeeded += 1,
            }
        }

        info!(
            "Batch complete: {}/{} built, {} unavailable, {} failed",
            summary.succeeded,
            summary.total,
            summary.unavailable.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    fn save(&self, dataset: &FeatureDataset) -> Result<PathBuf, DatasetError> {
        let kind = ArtifactKind::Dataset {
            ticker: dataset.ticker.clone(),
        };
        Ok(self.store.save_timestamped(dataset, &kind)?)
    }

    fn daily_sentiment(&self, articles: &[NewsArticle]) -> BTreeMap<NaiveDate, DailySentiment> {
        let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for article in articles {
            let entry = by_date.entry(article.published_at.date()).or_default();
            entry.0 += self.mapper.raw_sentiment(&article.headline);
            entry.1 += 1;
        }

        let means: Vec<Option<f64>> = by_date
            .values()
            .map(|(sum, n)| Some(sum / *n as f64))
            .collect();
        let rolling_3d = rolling_mean(&means, 3, 1);
        let rolling_7d = rolling_mean(&means, 7, 3);

        by_date
            .keys()
            .enumerate()
            .map(|(i, date)| {
                (
                    *date,
                    DailySentiment {
                        mean: means[i].unwrap_or_default(),
                        rolling_3d: rolling_3d[i],
                        rolling_7d: rolling_7d[i],
                    },
                )
            })
            .collect()
    }

    fn align(
        &self,
        ticker: &str,
        panel: &PricePanel,
        articles: &[NewsArticle],
        lookback_days: i64,
        now: NaiveDateTime,
    ) -> Option<FeatureDataset> {
        let ticker = normalize_symbol(ticker);

        let Some(series) = panel.close_series(&ticker) else {
            warn!("{} has no close prices in the price artifact", ticker);
            return None;
        };

        // Bars are stamped at midnight and compared against the full timestamp
        let end = now.date();
        let start = now - Duration::days(lookback_days.max(0));
        let (dates, closes): (Vec<NaiveDate>, Vec<f64>) = series
            .into_iter()
            .filter(|(d, _)| d.and_time(NaiveTime::MIN) >= start && *d <= end)
            .unzip();

        if dates.is_empty() {
            warn!("{} has no close prices between {} and {}", ticker, start, end);
            return None;
        }

        let ret_1d = pct_change(&closes, 1);
        let ret_5d = pct_change(&closes, 5);
        let ret_20d = pct_change(&closes, 20);
        let vol_20d = rolling_std(&ret_1d, VOL_WINDOW, VOL_MIN_PERIODS);
        let target = shift_back(&ret_1d, 1);

        let sentiment = self.daily_sentiment(articles);
        let sector_name = self.mapper.sector_for(&ticker);

        let mut rows = Vec::new();
        for (i, date) in dates.iter().enumerate() {
            let (Some(target), Some(daily)) = (target[i], sentiment.get(date)) else {
                continue;
            };
            rows.push(FeatureRow {
                date: *date,
                daily_sentiment: daily.mean,
                sentiment_3d: daily.rolling_3d,
                sentiment_7d: daily.rolling_7d,
                close_price_t: closes[i],
                ret_1d: ret_1d[i],
                ret_5d: ret_5d[i],
                ret_20d: ret_20d[i],
                vol_20d: vol_20d[i],
                target_pct_change: target,
                sector_name: sector_name.clone(),
                sector_feature: 0,
            });
        }

        if rows.is_empty() {
            warn!(
                "{}: no dates with both news sentiment and a next-day return",
                ticker
            );
            return None;
        }

        let codes: BTreeMap<String, u32> = rows
            .iter()
            .map(|r| r.sector_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .zip(0u32..)
            .collect();
        for row in &mut rows {
            row.sector_feature = codes.get(&row.sector_name).copied().unwrap_or_default();
        }

        info!("{}: built {} feature rows", ticker, rows.len());
        Some(FeatureDataset {
            ticker,
            rows,
            artifact: None,
        })
    }
}
