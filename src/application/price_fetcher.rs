use crate::application::universe_resolver::TickerUniverseResolver;
use crate::domain::errors::IngestError;
use crate::domain::market::{DailyBar, PricePanel};
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::universe::normalize_symbol;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Bulk daily OHLCV retrieval into a wide panel.
///
/// Per-ticker requests run concurrently (bounded by `concurrency`) and share
/// no state; results are merged by column key, so completion order does not
/// matter.
pub struct PriceSeriesFetcher {
    provider: Arc<dyn PriceHistoryProvider>,
    universe: Option<Arc<TickerUniverseResolver>>,
    concurrency: usize,
}

impl PriceSeriesFetcher {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            universe: None,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve the universe when `fetch` is called without tickers.
    pub fn with_universe(mut self, universe: Arc<TickerUniverseResolver>) -> Self {
        self.universe = Some(universe);
        self
    }

    async fn default_tickers(&self) -> Result<Vec<String>, IngestError> {
        match &self.universe {
            Some(resolver) => Ok(resolver.resolve().await?.symbols()),
            None => Err(IngestError::ProviderUnavailable {
                provider: "universe".to_string(),
                reason: "no tickers given and no universe resolver configured".to_string(),
            }),
        }
    }

    /// Fetch every ticker since `start` and prune all-empty columns.
    ///
    /// Tickers that fail are logged and left out; partial data is returned as
    /// is. An empty panel is `NoData`, unless every ticker failed and at least
    /// one failure came from a broken upstream, which is then returned.
    pub async fn fetch(
        &self,
        tickers: Option<&[String]>,
        start: NaiveDate,
    ) -> Result<PricePanel, IngestError> {
        let requested = match tickers {
            Some(list) => list.to_vec(),
            None => self.default_tickers().await?,
        };

        let mut seen = HashSet::new();
        let tickers: Vec<String> = requested
            .iter()
            .map(|t| normalize_symbol(t))
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        if tickers.is_empty() {
            return Err(IngestError::no_data("no tickers requested"));
        }

        info!(
            "Downloading daily prices for {} tickers from {} since {}",
            tickers.len(),
            self.provider.name(),
            start
        );

        let provider = &self.provider;
        let results: Vec<(String, Result<Vec<DailyBar>, IngestError>)> = stream::iter(tickers)
            .map(|ticker| async move {
                let result = provider.fetch_daily(&ticker, start).await;
                (ticker, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut bars_by_ticker = HashMap::new();
        let mut failures = Vec::new();
        for (ticker, result) in results {
            match result {
                Ok(bars) if !bars.is_empty() => {
                    debug!("{}: {} bars", ticker, bars.len());
                    bars_by_ticker.insert(ticker, bars);
                }
                Ok(_) => debug!("{}: no bars in range", ticker),
                Err(e) => {
                    warn!("Price fetch failed for {}: {}", ticker, e);
                    failures.push(e);
                }
            }
        }

        if bars_by_ticker.is_empty() {
            if let Some(upstream) = failures.into_iter().find(IngestError::is_upstream_fault) {
                return Err(upstream);
            }
            return Err(IngestError::no_data("no ticker returned price data"));
        }

        let mut panel = PricePanel::from_bars(bars_by_ticker);
        let pruned = panel.prune_empty_columns();
        if pruned > 0 {
            debug!("Pruned {} empty price columns", pruned);
        }

        if panel.is_empty() {
            return Err(IngestError::no_data("price panel is empty after pruning"));
        }

        info!(
            "Price panel ready: {} dates x {} columns",
            panel.dates().len(),
            panel.column_count()
        );
        Ok(panel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::PriceField;
    use crate::infrastructure::mock::{MockMetadataSource, MockPriceProvider, MockSymbolSource};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn tickers(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_partial_data_is_returned() {
        let provider = MockPriceProvider::new()
            .with_closes("AAPL", &[(date("2024-01-02"), 100.0), (date("2024-01-03"), 101.0)])
            .with_failure("MSFT", IngestError::source_unavailable("mock", "timeout"));
        let fetcher = PriceSeriesFetcher::new(Arc::new(provider), 4);

        let panel = fetcher
            .fetch(Some(&tickers(&["AAPL", "MSFT", "DELISTED"])), date("2024-01-01"))
            .await
            .unwrap();

        assert_eq!(panel.tickers(), vec!["AAPL"]);
        assert_eq!(
            panel.column("AAPL", PriceField::Close).unwrap(),
            &[Some(100.0), Some(101.0)]
        );
    }

    #[tokio::test]
    async fn test_all_missing_is_no_data() {
        let provider = MockPriceProvider::new().with_closes("AAPL", &[(date("2020-01-02"), 1.0)]);
        let fetcher = PriceSeriesFetcher::new(Arc::new(provider), 2);

        let err = fetcher
            .fetch(Some(&tickers(&["AAPL", "GONE"])), date("2024-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NoData { .. }));
    }

    #[tokio::test]
    async fn test_all_failed_upstream_is_reported() {
        let provider = MockPriceProvider::new()
            .with_failure("AAPL", IngestError::source_unavailable("mock", "HTTP 503"));
        let fetcher = PriceSeriesFetcher::new(Arc::new(provider), 2);

        let err = fetcher
            .fetch(Some(&tickers(&["AAPL", "GONE"])), date("2024-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_empty_columns_are_pruned() {
        let bar = DailyBar {
            date: date("2024-01-02"),
            open: None,
            high: None,
            low: None,
            close: Some(10.0),
            volume: None,
        };
        let provider = MockPriceProvider::new().with_bars("XYZ", vec![bar]);
        let fetcher = PriceSeriesFetcher::new(Arc::new(provider), 1);

        let panel = fetcher
            .fetch(Some(&tickers(&["XYZ"])), date("2024-01-01"))
            .await
            .unwrap();
        assert_eq!(panel.column_count(), 1);
        assert!(panel.column("XYZ", PriceField::Open).is_none());
    }

    #[tokio::test]
    async fn test_universe_used_when_no_tickers_given() {
        let provider = MockPriceProvider::new()
            .with_closes("BRK-B", &[(date("2024-01-02"), 350.0)])
            .with_closes("AAPL", &[(date("2024-01-02"), 185.0)]);
        let universe = TickerUniverseResolver::new(
            Arc::new(MockSymbolSource::new(["AAPL", "BRK.B"])),
            Arc::new(MockMetadataSource::new()),
        );
        let fetcher = PriceSeriesFetcher::new(Arc::new(provider.clone()), 2)
            .with_universe(Arc::new(universe));

        let panel = fetcher.fetch(None, date("2024-01-01")).await.unwrap();
        assert_eq!(panel.tickers(), vec!["AAPL", "BRK-B"]);
        assert_eq!(provider.requested().await, vec!["AAPL", "BRK-B"]);
    }

    #[tokio::test]
    async fn test_no_tickers_and_no_universe() {
        let fetcher = PriceSeriesFetcher::new(Arc::new(MockPriceProvider::new()), 1);
        let err = fetcher.fetch(None, date("2024-01-01")).await.unwrap_err();
        assert!(matches!(err, IngestError::ProviderUnavailable { .. }));
    }
}
