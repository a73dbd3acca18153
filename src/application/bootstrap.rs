use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::dataset::FeatureAligner;
use crate::application::news_ingester::NewsIngester;
use crate::application::price_fetcher::PriceSeriesFetcher;
use crate::application::sector_mapper::SectorSentimentMapper;
use crate::application::snapshot::MarketSnapshotService;
use crate::application::universe_resolver::{ResolvedUniverse, TickerUniverseResolver};
use crate::config::Config;
use crate::domain::ports::NewsProvider;
use crate::domain::sector_rules::RuleSet;
use crate::domain::sentiment::PolarityScorer;
use crate::infrastructure::http_client_factory::HttpClientFactory;
use crate::infrastructure::market_data::YahooChartProvider;
use crate::infrastructure::news::{FinnhubNewsProvider, RssNewsProvider, SentimentScorer};
use crate::infrastructure::persistence::ArtifactStore;
use crate::infrastructure::universe::{StockAnalysisSymbolSource, WikipediaMetadataSource};

/// Every pipeline component wired from configuration.
pub struct PipelineHandle {
    pub config: Config,
    pub universe: Arc<TickerUniverseResolver>,
    pub scorer: Arc<dyn PolarityScorer>,
    pub rules: RuleSet,
    pub snapshots: MarketSnapshotService,
}

impl PipelineHandle {
    /// A mapper with the default ticker → sector map.
    pub fn mapper(&self) -> SectorSentimentMapper {
        SectorSentimentMapper::new(self.scorer.clone()).with_rules(self.rules.clone())
    }

    /// A mapper whose sectors come from a resolved universe.
    pub fn mapper_for(&self, universe: &ResolvedUniverse) -> SectorSentimentMapper {
        self.mapper().with_universe(universe)
    }

    pub fn aligner(&self, mapper: SectorSentimentMapper, persist: bool) -> FeatureAligner {
        FeatureAligner::new(self.config.storage.clone(), Arc::new(mapper)).with_persist(persist)
    }
}

pub struct PipelineBootstrap;

impl PipelineBootstrap {
    pub fn init(config: Config) -> Result<PipelineHandle> {
        let sources = &config.sources;
        let client =
            HttpClientFactory::create_client(sources.http_timeout_secs, sources.http_max_retries);

        // 1. Universe sources
        let universe = Arc::new(TickerUniverseResolver::new(
            Arc::new(StockAnalysisSymbolSource::new(
                client.clone(),
                sources.stockanalysis_url.clone(),
            )),
            Arc::new(WikipediaMetadataSource::new(
                client.clone(),
                sources.wikipedia_url.clone(),
            )),
        ));

        // 2. Prices
        let prices = PriceSeriesFetcher::new(
            Arc::new(YahooChartProvider::new(
                client.clone(),
                sources.yahoo_chart_url.clone(),
                config.pipeline.price_auto_adjust,
            )),
            config.pipeline.price_fetch_concurrency,
        )
        .with_universe(universe.clone());

        // 3. News: Finnhub when keyed, else RSS when configured
        let news = match FinnhubNewsProvider::from_config(client.clone(), &sources.finnhub) {
            Ok(provider) => NewsIngester::new(Arc::new(provider) as Arc<dyn NewsProvider>),
            Err(e) => match &sources.news_rss_url {
                Some(url) => {
                    info!("Finnhub not configured, using RSS feed {}", url);
                    NewsIngester::new(Arc::new(RssNewsProvider::new(client.clone(), url.clone())))
                }
                None => {
                    warn!("No news provider configured: {}", e);
                    NewsIngester::unavailable(e)
                }
            },
        };

        // 4. Scoring and rules
        let scorer: Arc<dyn PolarityScorer> = Arc::new(SentimentScorer::new());
        let rules = match &config.pipeline.sector_rules_path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read sector rules {:?}", path))?;
                let rules = RuleSet::from_json(&content)
                    .with_context(|| format!("Failed to parse sector rules {:?}", path))?;
                info!(
                    "Loaded {} sector rules and {} keyword rules from {:?}",
                    rules.sector_rules.len(),
                    rules.keyword_rules.len(),
                    path
                );
                rules
            }
            None => RuleSet::builtin(),
        };

        let snapshots = MarketSnapshotService::new(
            news,
            prices,
            scorer.clone(),
            ArtifactStore::new(config.storage.clone()),
        );

        Ok(PipelineHandle {
            config,
            universe,
            scorer,
            rules,
            snapshots,
        })
    }
}
