use crate::domain::errors::IngestError;
use crate::domain::market::DailyBar;
use crate::domain::news::NewsArticle;
use crate::domain::universe::CompanyMetadata;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Authoritative source of universe membership.
#[async_trait]
pub trait SymbolListSource: Send + Sync {
    fn name(&self) -> &str;

    /// Raw symbols as published; normalization happens in the resolver.
    async fn fetch_symbols(&self) -> Result<Vec<String>, IngestError>;
}

/// Enrichment source: sector and founding year keyed by normalized symbol.
#[async_trait]
pub trait CompanyMetadataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_metadata(&self) -> Result<HashMap<String, CompanyMetadata>, IngestError>;
}

/// Daily OHLCV history for a single ticker.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
    ) -> Result<Vec<DailyBar>, IngestError>;
}

/// Category-scoped market news.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(vec![])` means the fetch worked and there simply was no news.
    async fn market_news(&self, category: &str) -> Result<Vec<NewsArticle>, IngestError>;
}
