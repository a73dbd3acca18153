//! Yahoo Finance daily price provider.
//!
//! Fetches daily OHLCV from Yahoo's v8 chart API. Yahoo has no official API
//! and changes its payload without notice; anything unexpected in the response
//! surfaces as `ParseFailure`.

use crate::domain::errors::IngestError;
use crate::domain::market::DailyBar;
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::http_client_factory::build_url_with_query;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::debug;

const ORIGIN: &str = "yahoo";

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

pub struct YahooChartProvider {
    client: ClientWithMiddleware,
    base_url: String,
    auto_adjust: bool,
}

impl YahooChartProvider {
    pub fn new(client: ClientWithMiddleware, base_url: impl Into<String>, auto_adjust: bool) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            auto_adjust,
        }
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        let end_ts = Utc::now().timestamp();

        build_url_with_query(
            &format!("{}/{}", self.base_url.trim_end_matches('/'), ticker),
            &[
                ("period1", start_ts.to_string()),
                ("period2", end_ts.to_string()),
                ("interval", "1d".to_string()),
                ("includeAdjustedClose", "true".to_string()),
            ],
        )
    }
}

/// Turn a chart payload into bars.
///
/// "Not Found" errors and empty histories are `NoData` (the ticker simply has
/// nothing in range); any other structural surprise is a `ParseFailure`.
/// With `auto_adjust`, OHLC are scaled by `adjclose / close`.
pub(crate) fn parse_chart(
    ticker: &str,
    resp: ChartResponse,
    auto_adjust: bool,
) -> Result<Vec<DailyBar>, IngestError> {
    let result = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result,
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(IngestError::no_data(format!("{}: {}", ticker, err.description)));
        }
        (None, Some(err)) => {
            return Err(IngestError::parse_failure(
                ORIGIN,
                format!("{}: {}", err.code, err.description),
            ));
        }
        (None, None) => {
            return Err(IngestError::parse_failure(ORIGIN, "empty result with no error"));
        }
    };

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::parse_failure(ORIGIN, "result array is empty"))?;

    // A ticker with no trades in range comes back without timestamps
    let Some(timestamps) = data.timestamp else {
        return Err(IngestError::no_data(format!("{}: no bars in range", ticker)));
    };

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| IngestError::parse_failure(ORIGIN, "no quote data"))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let cell = |values: &Vec<Option<f64>>, i: usize| values.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| IngestError::parse_failure(ORIGIN, format!("invalid timestamp: {}", ts)))?;

        let mut bar = DailyBar {
            date,
            open: cell(&quote.open, i),
            high: cell(&quote.high, i),
            low: cell(&quote.low, i),
            close: cell(&quote.close, i),
            volume: cell(&quote.volume, i),
        };

        // Skip bars where every field is missing (holidays, halted days)
        if bar.open.is_none()
            && bar.high.is_none()
            && bar.low.is_none()
            && bar.close.is_none()
            && bar.volume.is_none()
        {
            continue;
        }

        if auto_adjust {
            let adj = adj_closes.as_ref().and_then(|v| cell(v, i));
            if let (Some(adj), Some(close)) = (adj, bar.close) {
                if close != 0.0 {
                    let factor = adj / close;
                    bar.open = bar.open.map(|v| v * factor);
                    bar.high = bar.high.map(|v| v * factor);
                    bar.low = bar.low.map(|v| v * factor);
                    bar.close = Some(adj);
                }
            }
        }

        bars.push(bar);
    }

    Ok(bars)
}

#[async_trait]
impl PriceHistoryProvider for YahooChartProvider {
    fn name(&self) -> &str {
        ORIGIN
    }

    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
    ) -> Result<Vec<DailyBar>, IngestError> {
        let url = self.chart_url(ticker, start);
        debug!("Fetching daily bars for {} since {}", ticker, start);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::source_unavailable(ORIGIN, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IngestError::no_data(format!("{}: symbol not found", ticker)));
        }
        if !status.is_success() {
            return Err(IngestError::source_unavailable(
                ORIGIN,
                format!("HTTP {} for {}", status, ticker),
            ));
        }

        let chart: ChartResponse = response.json().await.map_err(|e| {
            IngestError::parse_failure(ORIGIN, format!("failed to parse response for {}: {}", ticker, e))
        })?;

        parse_chart(ticker, chart, self.auto_adjust)
    }
}
