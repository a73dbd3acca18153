use crate::domain::errors::StorageError;
use crate::domain::features::{FeatureDataset, FeatureRow};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk column names of the processed dataset.
#[derive(Serialize, Deserialize)]
struct DatasetRecord {
    date: chrono::NaiveDate,
    daily_sentiment: f64,
    sentiment_3d: Option<f64>,
    sentiment_7d: Option<f64>,
    #[serde(rename = "Close_Price_T")]
    close_price_t: f64,
    ret_1d: Option<f64>,
    ret_5d: Option<f64>,
    ret_20d: Option<f64>,
    vol_20d: Option<f64>,
    #[serde(rename = "Target_Pct_Change")]
    target_pct_change: f64,
    #[serde(rename = "Sector_Name")]
    sector_name: String,
    #[serde(rename = "Sector_Feature")]
    sector_feature: u32,
}

impl From<&FeatureRow> for DatasetRecord {
    fn from(r: &FeatureRow) -> Self {
        Self {
            date: r.date,
            daily_sentiment: r.daily_sentiment,
            sentiment_3d: r.sentiment_3d,
            sentiment_7d: r.sentiment_7d,
            close_price_t: r.close_price_t,
            ret_1d: r.ret_1d,
            ret_5d: r.ret_5d,
            ret_20d: r.ret_20d,
            vol_20d: r.vol_20d,
            target_pct_change: r.target_pct_change,
            sector_name: r.sector_name.clone(),
            sector_feature: r.sector_feature,
        }
    }
}

impl From<DatasetRecord> for FeatureRow {
    fn from(r: DatasetRecord) -> Self {
        Self {
            date: r.date,
            daily_sentiment: r.daily_sentiment,
            sentiment_3d: r.sentiment_3d,
            sentiment_7d: r.sentiment_7d,
            close_price_t: r.close_price_t,
            ret_1d: r.ret_1d,
            ret_5d: r.ret_5d,
            ret_20d: r.ret_20d,
            vol_20d: r.vol_20d,
            target_pct_change: r.target_pct_change,
            sector_name: r.sector_name,
            sector_feature: r.sector_feature,
        }
    }
}

pub(crate) fn write_dataset(dataset: &FeatureDataset, out: &mut Vec<u8>) -> Result<usize, csv::Error> {
    let mut writer = csv::Writer::from_writer(out);
    for row in &dataset.rows {
        writer.serialize(DatasetRecord::from(row))?;
    }
    writer.flush()?;
    Ok(dataset.rows.len())
}

pub fn read_dataset(path: &Path) -> Result<Vec<FeatureRow>, StorageError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| StorageError::csv(path, e))?;
    reader
        .deserialize::<DatasetRecord>()
        .map(|r| r.map(FeatureRow::from).map_err(|e| StorageError::csv(path, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_dataset_header_and_blank_cells() {
        let row = FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            daily_sentiment: 0.25,
            sentiment_3d: Some(0.25),
            sentiment_7d: None,
            close_price_t: 100.0,
            ret_1d: None,
            ret_5d: None,
            ret_20d: None,
            vol_20d: None,
            target_pct_change: 0.02,
            sector_name: "tech".to_string(),
            sector_feature: 0,
        };
        let dataset = FeatureDataset {
            ticker: "AAPL".to_string(),
            rows: vec![row.clone()],
            artifact: None,
        };

        let mut buf = Vec::new();
        write_dataset(&dataset, &mut buf).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "date,daily_sentiment,sentiment_3d,sentiment_7d,Close_Price_T,ret_1d,ret_5d,\
             ret_20d,vol_20d,Target_Pct_Change,Sector_Name,Sector_Feature"
        );
        assert_eq!(text.lines().nth(1).unwrap(), "2024-01-02,0.25,0.25,,100.0,,,,,0.02,tech,0");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ml.csv");
        std::fs::write(&path, &buf).unwrap();
        assert_eq!(read_dataset(&path).unwrap(), vec![row]);
    }
}
