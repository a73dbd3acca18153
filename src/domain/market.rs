//! Daily OHLCV bars and the wide `(ticker, field)` price panel.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

/// One of the five standard daily bar fields. Ordering follows OHLCV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl PriceField {
    pub const ALL: [PriceField; 5] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Open" => Ok(Self::Open),
            "High" => Ok(Self::High),
            "Low" => Ok(Self::Low),
            "Close" => Ok(Self::Close),
            "Volume" => Ok(Self::Volume),
            other => Err(format!("unknown price field '{}'", other)),
        }
    }
}

/// A daily bar as returned by a provider. Any field may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl DailyBar {
    pub fn field(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volume => self.volume,
        }
    }
}

/// Column identifier in the wide panel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnKey {
    pub ticker: String,
    pub field: PriceField,
}

impl ColumnKey {
    pub fn new(ticker: impl Into<String>, field: PriceField) -> Self {
        Self {
            ticker: ticker.into(),
            field,
        }
    }
}

/// Wide price panel: one row per trading date, one column per `(ticker, field)`.
///
/// Every column has exactly `dates.len()` cells; a missing value is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricePanel {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<ColumnKey, Vec<Option<f64>>>,
}

impl PricePanel {
    /// Merge per-ticker bars onto the union of their dates.
    ///
    /// Merging is keyed by column, so the order tickers arrive in is irrelevant.
    pub fn from_bars(bars_by_ticker: HashMap<String, Vec<DailyBar>>) -> Self {
        let dates: Vec<NaiveDate> = bars_by_ticker
            .values()
            .flat_map(|bars| bars.iter().map(|b| b.date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let index: HashMap<NaiveDate, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut columns = BTreeMap::new();
        for (ticker, bars) in bars_by_ticker {
            for field in PriceField::ALL {
                let mut cells = vec![None; dates.len()];
                for bar in &bars {
                    if let Some(&row) = index.get(&bar.date) {
                        cells[row] = bar.field(field).filter(|v| v.is_finite());
                    }
                }
                columns.insert(ColumnKey::new(ticker.clone(), field), cells);
            }
        }

        Self { dates, columns }
    }

    /// Build a panel from already aligned columns (e.g. read back from disk).
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        columns: BTreeMap<ColumnKey, Vec<Option<f64>>>,
    ) -> Result<Self, String> {
        if let Some((key, cells)) = columns.iter().find(|(_, c)| c.len() != dates.len()) {
            return Err(format!(
                "column {}/{} has {} cells for {} dates",
                key.ticker,
                key.field,
                cells.len(),
                dates.len()
            ));
        }
        Ok(Self { dates, columns })
    }

    /// Drop every column whose cells are all missing. Returns how many were dropped.
    pub fn prune_empty_columns(&mut self) -> usize {
        let before = self.columns.len();
        self.columns
            .retain(|_, cells| cells.iter().any(|c| c.is_some()));
        before - self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> impl Iterator<Item = (&ColumnKey, &[Option<f64>])> {
        self.columns.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, ticker: &str, field: PriceField) -> Option<&[Option<f64>]> {
        self.columns
            .get(&ColumnKey::new(ticker, field))
            .map(|v| v.as_slice())
    }

    /// Distinct tickers with at least one column, sorted.
    pub fn tickers(&self) -> Vec<String> {
        self.columns
            .keys()
            .map(|k| k.ticker.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Close prices for a ticker with missing cells dropped, or `None` if the
    /// ticker has no close column at all.
    pub fn close_series(&self, ticker: &str) -> Option<Vec<(NaiveDate, f64)>> {
        let cells = self.column(ticker, PriceField::Close)?;
        Some(
            self.dates
                .iter()
                .zip(cells)
                .filter_map(|(date, cell)| cell.map(|v| (*date, v)))
                .collect(),
        )
    }
}
