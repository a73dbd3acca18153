use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One supervised-learning row for `(ticker, date)`.
///
/// A row only exists when `target_pct_change` is defined, i.e. the date is
/// not the last one of its close series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub daily_sentiment: f64,
    pub sentiment_3d: Option<f64>,
    pub sentiment_7d: Option<f64>,
    pub close_price_t: f64,
    pub ret_1d: Option<f64>,
    pub ret_5d: Option<f64>,
    pub ret_20d: Option<f64>,
    pub vol_20d: Option<f64>,
    pub target_pct_change: f64,
    pub sector_name: String,
    pub sector_feature: u32,
}

/// Output of one alignment run for a ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDataset {
    pub ticker: String,
    pub rows: Vec<FeatureRow>,
    /// Where the dataset was written, when persistence was requested.
    pub artifact: Option<PathBuf>,
}

impl FeatureDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}
