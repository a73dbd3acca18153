use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compound scores at or above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound scores at or below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Inclusive thresholds: `0.05` is Positive, `-0.05` is Negative.
    pub fn from_compound(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            Self::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            Self::Negative
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => write!(f, "Positive"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Negative => write!(f, "Negative"),
        }
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(format!("unknown sentiment label '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub compound: f64, // -1.0 to 1.0
    pub label: SentimentLabel,
}

impl SentimentScore {
    pub fn from_compound(compound: f64) -> Self {
        Self {
            compound,
            label: SentimentLabel::from_compound(compound),
        }
    }

    pub fn neutral() -> Self {
        Self::from_compound(0.0)
    }
}

/// A pure text → polarity function.
///
/// Implementations must be deterministic and free of side effects. Empty
/// text scores `0.0`.
pub trait PolarityScorer: Send + Sync {
    /// Compound polarity in `[-1, 1]`.
    fn compound(&self, text: &str) -> f64;

    fn score(&self, text: &str) -> SentimentScore {
        if text.trim().is_empty() {
            return SentimentScore::neutral();
        }
        SentimentScore::from_compound(self.compound(text).clamp(-1.0, 1.0))
    }

    fn classify(&self, text: &str) -> SentimentLabel {
        self.score(text).label
    }
}
