//! Wide price panel CSV with a two-level `(ticker, field)` header.
//!
//! ```text
//! Ticker,AAPL,AAPL,...
//! Price,Open,High,...
//! Date,,,...
//! 2024-01-02,187.15,188.44,...
//! ```
//! Missing values are empty cells.

use crate::domain::errors::StorageError;
use crate::domain::market::{ColumnKey, PriceField, PricePanel};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::Path;

const TICKER_LABEL: &str = "Ticker";
const FIELD_LABEL: &str = "Price";
const INDEX_LABEL: &str = "Date";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn write_panel(panel: &PricePanel, out: &mut Vec<u8>) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(out);

    let keys: Vec<&ColumnKey> = panel.columns().map(|(k, _)| k).collect();
    let cells: Vec<&[Option<f64>]> = panel.columns().map(|(_, c)| c).collect();

    let mut tickers = vec![TICKER_LABEL.to_string()];
    tickers.extend(keys.iter().map(|k| k.ticker.clone()));
    writer.write_record(&tickers)?;

    let mut fields = vec![FIELD_LABEL.to_string()];
    fields.extend(keys.iter().map(|k| k.field.to_string()));
    writer.write_record(&fields)?;

    let mut index_row = vec![INDEX_LABEL.to_string()];
    index_row.extend(keys.iter().map(|_| String::new()));
    writer.write_record(&index_row)?;

    for (row, date) in panel.dates().iter().enumerate() {
        let mut record = Vec::with_capacity(keys.len() + 1);
        record.push(date.format(DATE_FORMAT).to_string());
        for column in &cells {
            record.push(column[row].map(|v| v.to_string()).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(panel.dates().len())
}

fn header_cells(record: Option<csv::StringRecord>, label: &str, path: &Path) -> Result<Vec<String>, StorageError> {
    let record = record.ok_or_else(|| StorageError::malformed(path, format!("missing '{}' header row", label)))?;
    let mut cells = record.iter();
    match cells.next() {
        Some(first) if first.trim() == label => Ok(cells.map(|c| c.trim().to_string()).collect()),
        other => Err(StorageError::malformed(
            path,
            format!("expected '{}' header row, found {:?}", label, other),
        )),
    }
}

pub fn read_panel(path: &Path) -> Result<PricePanel, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| StorageError::csv(path, e))?;

    let mut records = reader.records();
    let mut next = || records.next().transpose().map_err(|e| StorageError::csv(path, e));

    let tickers = header_cells(next()?, TICKER_LABEL, path)?;
    let fields = header_cells(next()?, FIELD_LABEL, path)?;
    if tickers.len() != fields.len() {
        return Err(StorageError::malformed(path, "header rows differ in width"));
    }

    let mut keys = Vec::with_capacity(tickers.len());
    for (ticker, field) in tickers.iter().zip(&fields) {
        let field: PriceField = field
            .parse()
            .map_err(|e: String| StorageError::malformed(path, e))?;
        keys.push(ColumnKey::new(ticker.clone(), field));
    }

    let mut dates = Vec::new();
    let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); keys.len()];

    while let Some(record) = next()? {
        let mut cells = record.iter();
        let first = cells.next().unwrap_or_default().trim();
        let values: Vec<&str> = cells.map(str::trim).collect();

        let Ok(date) = NaiveDate::parse_from_str(first, DATE_FORMAT) else {
            // Index-name row (`Date,,,`) or similar filler
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }
            return Err(StorageError::malformed(path, format!("unparseable date '{}'", first)));
        };

        if values.len() != keys.len() {
            return Err(StorageError::malformed(
                path,
                format!("row {} has {} cells, expected {}", first, values.len(), keys.len()),
            ));
        }

        dates.push(date);
        for (column, value) in columns.iter_mut().zip(values) {
            let cell = if value.is_empty() {
                None
            } else {
                let v: f64 = value.parse().map_err(|_| {
                    StorageError::malformed(path, format!("non-numeric cell '{}' on {}", value, first))
                })?;
                Some(v).filter(|v| v.is_finite())
            };
            column.push(cell);
        }
    }

    let total = keys.len();
    let map: BTreeMap<ColumnKey, Vec<Option<f64>>> = keys.into_iter().zip(columns).collect();
    if map.len() != total {
        return Err(StorageError::malformed(path, "duplicate (ticker, field) column"));
    }

    PricePanel::from_columns(dates, map).map_err(|e| StorageError::malformed(path, e))
}
