//! In-memory adapters for every port, used by tests and offline runs.

use crate::domain::errors::IngestError;
use crate::domain::market::DailyBar;
use crate::domain::news::NewsArticle;
use crate::domain::ports::{
    CompanyMetadataSource, NewsProvider, PriceHistoryProvider, SymbolListSource,
};
use crate::domain::sentiment::PolarityScorer;
use crate::domain::universe::CompanyMetadata;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct MockSymbolSource {
    result: Result<Vec<String>, IngestError>,
}

impl MockSymbolSource {
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        Self {
            result: Ok(symbols.into_iter().map(Into::into).collect()),
        }
    }

    pub fn failing(error: IngestError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl SymbolListSource for MockSymbolSource {
    fn name(&self) -> &str {
        "mock-symbols"
    }

    async fn fetch_symbols(&self) -> Result<Vec<String>, IngestError> {
        self.result.clone()
    }
}

#[derive(Clone)]
pub struct MockMetadataSource {
    result: Result<HashMap<String, CompanyMetadata>, IngestError>,
}

impl MockMetadataSource {
    pub fn new() -> Self {
        Self {
            result: Ok(HashMap::new()),
        }
    }

    pub fn failing(error: IngestError) -> Self {
        Self { result: Err(error) }
    }

    pub fn with_company(mut self, symbol: &str, sector: &str, founded_year: &str) -> Self {
        if let Ok(map) = &mut self.result {
            map.insert(
                symbol.to_string(),
                CompanyMetadata {
                    sector: sector.to_string(),
                    founded_year: founded_year.to_string(),
                },
            );
        }
        self
    }
}

impl Default for MockMetadataSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompanyMetadataSource for MockMetadataSource {
    fn name(&self) -> &str {
        "mock-metadata"
    }

    async fn fetch_metadata(&self) -> Result<HashMap<String, CompanyMetadata>, IngestError> {
        self.result.clone()
    }
}

/// Serves canned bars per ticker and records which tickers were requested.
#[derive(Clone, Default)]
pub struct MockPriceProvider {
    bars: HashMap<String, Vec<DailyBar>>,
    failures: HashMap<String, IngestError>,
    requested: Arc<RwLock<Vec<String>>>,
}

impl MockPriceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<DailyBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self
    }

    /// Bars with every OHLC field set to the close.
    pub fn with_closes(self, ticker: &str, closes: &[(NaiveDate, f64)]) -> Self {
        let bars = closes
            .iter()
            .map(|&(date, close)| DailyBar {
                date,
                open: Some(close),
                high: Some(close),
                low: Some(close),
                close: Some(close),
                volume: Some(1_000.0),
            })
            .collect();
        self.with_bars(ticker, bars)
    }

    pub fn with_failure(mut self, ticker: &str, error: IngestError) -> Self {
        self.failures.insert(ticker.to_string(), error);
        self
    }

    pub async fn requested(&self) -> Vec<String> {
        let mut tickers = self.requested.read().await.clone();
        tickers.sort();
        tickers
    }
}

#[async_trait]
impl PriceHistoryProvider for MockPriceProvider {
    fn name(&self) -> &str {
        "mock-prices"
    }

    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
    ) -> Result<Vec<DailyBar>, IngestError> {
        self.requested.write().await.push(ticker.to_string());

        if let Some(error) = self.failures.get(ticker) {
            return Err(error.clone());
        }

        match self.bars.get(ticker) {
            Some(bars) => Ok(bars.iter().filter(|b| b.date >= start).cloned().collect()),
            None => Err(IngestError::no_data(format!("{}: unknown ticker", ticker))),
        }
    }
}

#[derive(Clone)]
pub struct MockNewsProvider {
    result: Result<Vec<NewsArticle>, IngestError>,
}

impl MockNewsProvider {
    pub fn new(articles: Vec<NewsArticle>) -> Self {
        Self {
            result: Ok(articles),
        }
    }

    pub fn failing(error: IngestError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl NewsProvider for MockNewsProvider {
    fn name(&self) -> &str {
        "mock-news"
    }

    async fn market_news(&self, _category: &str) -> Result<Vec<NewsArticle>, IngestError> {
        self.result.clone()
    }
}

/// Scores text by exact lookup; anything unknown is neutral.
#[derive(Clone, Default)]
pub struct MockScorer {
    scores: HashMap<String, f64>,
}

impl MockScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, text: &str, compound: f64) -> Self {
        self.scores.insert(text.to_string(), compound);
        self
    }
}

impl PolarityScorer for MockScorer {
    fn compound(&self, text: &str) -> f64 {
        self.scores.get(text).copied().unwrap_or(0.0)
    }
}
