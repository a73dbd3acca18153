//! Lexicon-based sentiment scoring using VADER
//!
//! This module provides the compound polarity score for news headlines and
//! summaries using the VADER (Valence Aware Dictionary and sEntiment Reasoner)
//! algorithm, and the three-way label derived from it.
//!
//! # Example
//! ```rust,ignore
//! use quanta::domain::sentiment::PolarityScorer;
//! use quanta::infrastructure::news::sentiment_analyzer::SentimentScorer;
//!
//! let scorer = SentimentScorer::new();
//! let score = scorer.score("Markets rally on strong earnings");
//! assert!(score.compound > 0.0);
//! ```

use crate::domain::sentiment::PolarityScorer;
use vader_sentiment::SentimentIntensityAnalyzer;

/// A thread-safe VADER scorer.
///
/// The lexicon is loaded once on construction; share one instance behind an
/// `Arc` rather than building one per document.
pub struct SentimentScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl SentimentScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for SentimentScorer {
    fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }

        let scores = self.analyzer.polarity_scores(text);
        scores.get("compound").copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::{NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD, SentimentLabel};

    #[test]
    fn test_positive_headline() {
        let scorer = SentimentScorer::new();
        let score = scorer.score("markets rally on strong earnings");
        assert!(score.compound > 0.0, "got {}", score.compound);
        assert_eq!(score.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_negative_headlines() {
        let scorer = SentimentScorer::new();

        let bearish_headlines = [
            "Stocks crash in terrible sell-off as panic spreads",
            "Company hit with fraud lawsuit, shares collapse",
            "Investors fear a devastating recession",
        ];

        for headline in bearish_headlines {
            let score = scorer.score(headline);
            assert!(
                score.compound < 0.0,
                "Expected negative score for '{}', got {}",
                headline,
                score.compound
            );
        }
    }

    #[test]
    fn test_empty_text() {
        let scorer = SentimentScorer::new();
        assert_eq!(scorer.compound(""), 0.0);
        assert_eq!(scorer.score("   ").compound, 0.0);
        assert_eq!(scorer.classify(""), SentimentLabel::Neutral);
    }

    #[test]
    fn test_label_agrees_with_score() {
        let scorer = SentimentScorer::new();

        let headlines = [
            "Quarterly earnings report released",
            "Great results lift shares to record",
            "Outlook cut after weak demand",
            "Market closes unchanged from previous session",
        ];

        for headline in headlines {
            let score = scorer.score(headline);
            assert!((-1.0..=1.0).contains(&score.compound));
            let expected = if score.compound >= POSITIVE_THRESHOLD {
                SentimentLabel::Positive
            } else if score.compound <= NEGATIVE_THRESHOLD {
                SentimentLabel::Negative
            } else {
                SentimentLabel::Neutral
            };
            assert_eq!(scorer.classify(headline), expected);
        }
    }

    #[test]
    fn test_deterministic() {
        let scorer = SentimentScorer::new();
        let text = "Tech shares slide as chip shortage worsens";
        assert_eq!(scorer.compound(text), scorer.compound(text));
    }
}
