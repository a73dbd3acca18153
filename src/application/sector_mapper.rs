//! Headline → sector signals and ticker → sector assignment.

use crate::application::universe_resolver::ResolvedUniverse;
use crate::domain::sector_rules::{RuleSet, SectorSentiment};
use crate::domain::sentiment::PolarityScorer;
use crate::domain::universe::UNKNOWN_SECTOR;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Used when no universe was resolved.
const DEFAULT_SECTORS: [(&str, &str); 7] = [
    ("LMT", "defense"),
    ("MSFT", "tech"),
    ("GOOGL", "tech"),
    ("BA", "defense"),
    ("NVDA", "tech"),
    ("AAPL", "tech"),
    ("JNJ", "healthcare"),
];

/// Everything the mapper derives from one headline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineFeatures {
    pub raw_sentiment: f64,
    pub sector_impact: BTreeMap<String, SectorSentiment>,
    pub keyword_weights: BTreeMap<String, BTreeMap<String, f64>>,
}

pub struct SectorSentimentMapper {
    rules: RuleSet,
    scorer: Arc<dyn PolarityScorer>,
    sectors: Option<HashMap<String, String>>,
}

impl SectorSentimentMapper {
    pub fn new(scorer: Arc<dyn PolarityScorer>) -> Self {
        Self {
            rules: RuleSet::builtin(),
            scorer,
            sectors: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Assign sectors from a resolved universe instead of the default map.
    pub fn with_universe(mut self, universe: &ResolvedUniverse) -> Self {
        self.sectors = Some(universe.sector_map());
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// `sector → qualitative sentiment` for every matching sector rule.
    ///
    /// When two matching rules name the same sector, the later rule's
    /// sentiment is kept.
    pub fn sector_impact(&self, headline: &str) -> BTreeMap<String, SectorSentiment> {
        self.rules
            .matching_sector_rules(headline)
            .into_iter()
            .map(|r| (r.sector.clone(), r.sentiment))
            .collect()
    }

    /// `keyword → {target: weight}` for every matching keyword rule.
    pub fn keyword_weights(&self, headline: &str) -> BTreeMap<String, BTreeMap<String, f64>> {
        let mut weights: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for rule in self.rules.matching_keyword_rules(headline) {
            weights
                .entry(rule.keyword.clone())
                .or_default()
                .insert(rule.target.clone(), rule.weight);
        }
        weights
    }

    pub fn raw_sentiment(&self, headline: &str) -> f64 {
        self.scorer.score(headline).compound
    }

    pub fn features(&self, headline: &str) -> HeadlineFeatures {
        HeadlineFeatures {
            raw_sentiment: self.raw_sentiment(headline),
            sector_impact: self.sector_impact(headline),
            keyword_weights: self.keyword_weights(headline),
        }
    }

    pub fn sector_for(&self, ticker: &str) -> String {
        let found = match &self.sectors {
            Some(sectors) => sectors.get(ticker).cloned(),
            None => DEFAULT_SECTORS
                .iter()
                .find(|(t, _)| *t == ticker)
                .map(|(_, s)| s.to_string()),
        };
        found.unwrap_or_else(|| UNKNOWN_SECTOR.to_string())
    }
}
