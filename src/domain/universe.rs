//! Ticker universe types and symbol/metadata normalization rules.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

pub const UNKNOWN_SECTOR: &str = "unknown";
pub const UNKNOWN_FOUNDED: &str = "N/A";

static FOUR_DIGIT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("static regex"));

static FOUNDED_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)founded in (\d{4})").expect("static regex"),
        Regex::new(r"(?i)established in (\d{4})").expect("static regex"),
        Regex::new(r"(?i)(?:since|established|founded)\s+(\d{4})").expect("static regex"),
    ]
});

/// One member of the resolved universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    pub symbol: String,
    pub sector: String,
    pub founded_year: String,
}

impl TickerRecord {
    /// Record for a symbol with no enrichment metadata.
    pub fn unenriched(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            sector: UNKNOWN_SECTOR.to_string(),
            founded_year: UNKNOWN_FOUNDED.to_string(),
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.sector != UNKNOWN_SECTOR || self.founded_year != UNKNOWN_FOUNDED
    }
}

/// Sector/founding metadata scraped from the enrichment source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMetadata {
    pub sector: String,
    pub founded_year: String,
}

/// Normalize a raw symbol: trim whitespace, `.` becomes `-` (Yahoo style).
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().replace('.', "-")
}

/// Lower-cased first token of a sector label, commas removed.
///
/// "Information Technology" -> "information", "Consumer Staples" -> "consumer".
pub fn sector_key(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .next()
        .map(|token| token.replace(',', "").trim().to_string())
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| UNKNOWN_SECTOR.to_string())
}

/// First standalone 4-digit number in a table cell, else "N/A".
pub fn first_year(cell: &str) -> String {
    FOUR_DIGIT_YEAR
        .captures(cell)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_FOUNDED.to_string())
}

/// Find a founding year in free text ("founded in 1976", "since 1980", ...).
pub fn extract_founding_year(text: &str) -> String {
    if text.trim().is_empty() {
        return UNKNOWN_FOUNDED.to_string();
    }

    FOUNDED_PATTERNS
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_FOUNDED.to_string())
}
