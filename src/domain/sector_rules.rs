//! Keyword rules linking headlines to sectors.
//!
//! Two flat rule lists replace nested lookup tables:
//! - `SectorRule`: keyword → sector with a qualitative sentiment
//! - `KeywordRule`: keyword → target with a numeric weight
//!
//! Matching is case-insensitive substring containment. Every matching rule is
//! reported; there is no precedence between rules.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorSentiment {
    Positive,
    Negative,
    /// Effect depends on context (e.g. a pandemic for healthcare).
    Complex,
}

impl fmt::Display for SectorSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Complex => write!(f, "complex"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorRule {
    pub keyword: String,
    pub sector: String,
    pub sentiment: SectorSentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub sector_rules: Vec<SectorRule>,
    pub keyword_rules: Vec<KeywordRule>,
}

fn sector_rule(keyword: &str, sector: &str, sentiment: SectorSentiment) -> SectorRule {
    SectorRule {
        keyword: keyword.to_string(),
        sector: sector.to_string(),
        sentiment,
    }
}

fn keyword_rule(keyword: &str, target: &str, weight: f64) -> KeywordRule {
    KeywordRule {
        keyword: keyword.to_string(),
        target: target.to_string(),
        weight,
    }
}

fn contains_ci(haystack_lower: &str, needle: &str) -> bool {
    haystack_lower.contains(&needle.to_lowercase())
}

impl RuleSet {
    /// The built-in geopolitical/sector rules.
    pub fn builtin() -> Self {
        use SectorSentiment::*;

        Self {
            sector_rules: vec![
                sector_rule("war", "defense", Positive),
                sector_rule("conflict", "defense", Positive),
                sector_rule("military_spending", "defense", Positive),
                sector_rule("war", "tech", Negative),
                sector_rule("cybersecurity_threat", "tech", Negative),
                sector_rule("chip_shortage", "tech", Negative),
                sector_rule("pandemic", "healthcare", Complex),
                sector_rule("medical_breakthrough", "healthcare", Positive),
            ],
            keyword_rules: vec![
                keyword_rule("war", "defense_stocks", 0.7),
                keyword_rule("war", "tech_stocks", -0.5),
                keyword_rule("war", "energy_stocks", 0.3),
                keyword_rule("pandemic", "healthcare_stocks", 0.6),
                keyword_rule("pandemic", "tech_stocks", 0.4),
                keyword_rule("pandemic", "retail_stocks", -0.3),
            ],
        }
    }

    /// Load a rule set from JSON (same shape as the serialized `RuleSet`).
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn matching_sector_rules(&self, headline: &str) -> Vec<&SectorRule> {
        let lower = headline.to_lowercase();
        self.sector_rules
            .iter()
            .filter(|r| contains_ci(&lower, &r.keyword))
            .collect()
    }

    pub fn matching_keyword_rules(&self, headline: &str) -> Vec<&KeywordRule> {
        let lower = headline.to_lowercase();
        self.keyword_rules
            .iter()
            .filter(|r| contains_ci(&lower, &r.keyword))
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}
