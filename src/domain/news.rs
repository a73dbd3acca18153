use super::sentiment::SentimentLabel;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single news item as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub headline: String,
    pub summary: String,
    pub source: String,
    /// Second precision, no timezone marker.
    pub published_at: NaiveDateTime,
}

/// A news article with its sentiment label attached, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledArticle {
    pub article: NewsArticle,
    pub sentiment: SentimentLabel,
}
