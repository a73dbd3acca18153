use crate::domain::errors::IngestError;
use crate::domain::ports::{CompanyMetadataSource, SymbolListSource};
use crate::domain::universe::{TickerRecord, UNKNOWN_SECTOR, normalize_symbol};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one universe resolution.
///
/// `enrichment_error` is set when the metadata source failed; every record
/// then carries the unknown defaults, but membership is still complete.
#[derive(Debug, Clone)]
pub struct ResolvedUniverse {
    pub records: Vec<TickerRecord>,
    pub enrichment_error: Option<IngestError>,
}

impl ResolvedUniverse {
    pub fn symbols(&self) -> Vec<String> {
        self.records.iter().map(|r| r.symbol.clone()).collect()
    }

    /// `symbol → sector` for every record.
    pub fn sector_map(&self) -> HashMap<String, String> {
        self.records
            .iter()
            .map(|r| (r.symbol.clone(), r.sector.clone()))
            .collect()
    }

    /// Sector for each requested ticker, `"unknown"` when not in the universe.
    pub fn sectors_for(&self, tickers: &[String]) -> HashMap<String, String> {
        let sectors = self.sector_map();
        tickers
            .iter()
            .map(|t| {
                let symbol = normalize_symbol(t);
                let sector = sectors
                    .get(&symbol)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_SECTOR.to_string());
                (t.clone(), sector)
            })
            .collect()
    }
}

/// Merges universe membership (source A) with sector/founding metadata
/// (source B).
pub struct TickerUniverseResolver {
    symbols: Arc<dyn SymbolListSource>,
    metadata: Arc<dyn CompanyMetadataSource>,
}

impl TickerUniverseResolver {
    pub fn new(
        symbols: Arc<dyn SymbolListSource>,
        metadata: Arc<dyn CompanyMetadataSource>,
    ) -> Self {
        Self { symbols, metadata }
    }

    /// Membership failures abort; metadata failures degrade every record to
    /// `unknown` / `N/A` and are reported in `enrichment_error`.
    pub async fn resolve(&self) -> Result<ResolvedUniverse, IngestError> {
        info!("Fetching S&P 500 tickers from {}...", self.symbols.name());
        let raw = self.symbols.fetch_symbols().await?;

        let mut seen = HashSet::new();
        let symbols: Vec<String> = raw
            .iter()
            .map(|s| normalize_symbol(s))
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        if symbols.is_empty() {
            return Err(IngestError::source_unavailable(
                self.symbols.name(),
                "symbol list is empty",
            ));
        }
        info!("Resolved {} tickers", symbols.len());

        let (metadata, enrichment_error) = match self.metadata.fetch_metadata().await {
            Ok(metadata) => (metadata, None),
            Err(e) => {
                warn!(
                    "Metadata source {} failed, sectors default to unknown: {}",
                    self.metadata.name(),
                    e
                );
                (HashMap::new(), Some(e))
            }
        };

        let records: Vec<TickerRecord> = symbols
            .into_iter()
            .map(|symbol| match metadata.get(&symbol) {
                Some(meta) => TickerRecord {
                    symbol,
                    sector: meta.sector.clone(),
                    founded_year: meta.founded_year.clone(),
                },
                None => TickerRecord::unenriched(symbol),
            })
            .collect();

        let unenriched = records.iter().filter(|r| !r.is_enriched()).count();
        if enrichment_error.is_none() && unenriched > 0 {
            warn!("{} tickers have no sector/founding metadata", unenriched);
        }

        Ok(ResolvedUniverse {
            records,
            enrichment_error,
        })
    }

    /// Resolve the universe and look up sectors for a subset of tickers.
    pub async fn sectors_for(
        &self,
        tickers: &[String],
    ) -> Result<HashMap<String, String>, IngestError> {
        Ok(self.resolve().await?.sectors_for(tickers))
    }
}
