//! Artifact kinds and their timestamped file names.

use chrono::NaiveDateTime;
use std::fmt;

/// `YYYYMMDD_HHMMSS`, local wall clock, no timezone marker.
pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Prices,
    News,
    Dataset { ticker: String },
}

impl ArtifactKind {
    /// File name prefix shared by every artifact of this kind.
    pub fn prefix(&self) -> String {
        match self {
            Self::Prices => "sp500_prices_web_pull".to_string(),
            Self::News => "market_news_sentiment".to_string(),
            Self::Dataset { ticker } => format!("ml_data_{}", ticker),
        }
    }

    /// Glob pattern matching every artifact of this kind.
    pub fn pattern(&self) -> String {
        format!("{}_*.csv", self.prefix())
    }

    /// `<kind>_<YYYYMMDD_HHMMSS>.csv`
    pub fn filename(&self, at: NaiveDateTime) -> String {
        format!("{}_{}.csv", self.prefix(), at.format(ARTIFACT_TIMESTAMP_FORMAT))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_filenames() {
        let at = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 1)
            .unwrap();
        assert_eq!(
            ArtifactKind::Prices.filename(at),
            "sp500_prices_web_pull_20250307_090501.csv"
        );
        assert_eq!(
            ArtifactKind::Dataset { ticker: "MSFT".into() }.filename(at),
            "ml_data_MSFT_20250307_090501.csv"
        );
        assert_eq!(ArtifactKind::News.pattern(), "market_news_sentiment_*.csv");
    }
}
