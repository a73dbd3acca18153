use chrono::{NaiveDate, NaiveDateTime};
use quanta::application::{
    FeatureAligner, MarketSnapshotService, NewsIngester, PriceSeriesFetcher, SectorSentimentMapper,
    TickerUniverseResolver,
};
use quanta::config::StorageEnvConfig;
use quanta::domain::artifact::ArtifactKind;
use quanta::domain::errors::IngestError;
use quanta::domain::news::NewsArticle;
use quanta::domain::sentiment::PolarityScorer;
use quanta::infrastructure::mock::{
    MockMetadataSource, MockNewsProvider, MockPriceProvider, MockSymbolSource,
};
use quanta::infrastructure::news::SentimentScorer;
use quanta::infrastructure::persistence::{ArtifactStore, LatestArtifactCache, dataset_csv};
use std::sync::Arc;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

const TRADING_DAYS: [&str; 8] = [
    "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05",
    "2024-01-08", "2024-01-09", "2024-01-10", "2024-01-11",
];

fn closes(base: f64) -> Vec<(NaiveDate, f64)> {
    TRADING_DAYS
        .iter()
        .enumerate()
        .map(|(i, d)| (date(d), base + i as f64))
        .collect()
}

fn article(headline: &str, ts: &str) -> NewsArticle {
    NewsArticle {
        headline: headline.to_string(),
        summary: String::new(),
        source: "wire".to_string(),
        published_at: at(ts),
    }
}

#[tokio::test]
async fn test_universe_to_dataset_flow() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();

    let dir = tempfile::tempdir()?;
    let storage = StorageEnvConfig::with_data_dir(dir.path());

    // 1. Universe: one ticker has metadata, one has no prices
    let universe = Arc::new(TickerUniverseResolver::new(
        Arc::new(MockSymbolSource::new(["AAPL", "LMT", "BRK.B"])),
        Arc::new(MockMetadataSource::new().with_company("LMT", "industrials", "1995")),
    ));
    let resolved = universe.resolve().await?;
    assert_eq!(resolved.symbols(), vec!["AAPL", "LMT", "BRK-B"]);

    // 2. Snapshots: universe prices and labeled news, both persisted
    let prices = MockPriceProvider::new()
        .with_closes("AAPL", &closes(180.0))
        .with_closes("LMT", &closes(450.0))
        .with_failure("BRK-B", IngestError::no_data("delisted"));
    let news = MockNewsProvider::new(vec![
        article("War fears lift defense contractors", "2024-01-02 08:00:00"),
        article("Strong earnings boost markets", "2024-01-03 13:30:00"),
        article("Stocks slump on weak outlook", "2024-01-03 15:00:00"),
        article("Markets rally on strong earnings", "2024-01-05 09:00:00"),
        article("Great quarter for chipmakers", "2024-01-10 10:00:00"),
        article("Late headline without a next-day price", "2024-01-11 10:00:00"),
    ]);
    let scorer: Arc<dyn PolarityScorer> = Arc::new(SentimentScorer::new());

    let service = MarketSnapshotService::new(
        NewsIngester::new(Arc::new(news)),
        PriceSeriesFetcher::new(Arc::new(prices.clone()), 4).with_universe(universe.clone()),
        scorer.clone(),
        ArtifactStore::new(storage.clone()),
    );

    let price_snapshot = service.refresh_prices(None, date("2024-01-01"), true).await?;
    assert_eq!(price_snapshot.panel.tickers(), vec!["AAPL", "LMT"]);
    assert_eq!(prices.requested().await, vec!["AAPL", "BRK-B", "LMT"]);

    let news_snapshot = service.refresh_news("general", true).await?;
    assert_eq!(news_snapshot.articles.len(), 6);

    let cache = LatestArtifactCache::new(storage.clone());
    assert_eq!(cache.resolve(&ArtifactKind::Prices)?, price_snapshot.artifact);
    assert_eq!(cache.resolve(&ArtifactKind::News)?, news_snapshot.artifact);

    // 3. Alignment with universe sectors
    let mapper = SectorSentimentMapper::new(scorer).with_universe(&resolved);
    let aligner = FeatureAligner::new(storage, Arc::new(mapper)).with_persist(true);
    let now = at("2024-01-15 18:00:00");

    let dataset = aligner.build_at("LMT", 365, now)?.expect("dataset for LMT");
    assert_eq!(
        dataset.dates(),
        vec![date("2024-01-02"), date("2024-01-03"), date("2024-01-05"), date("2024-01-10")]
    );
    assert!(dataset.rows.iter().all(|r| r.sector_name == "industrials"));
    assert!((dataset.rows[0].target_pct_change - 1.0 / 450.0).abs() < 1e-12);
    assert_eq!(dataset.rows[0].sentiment_7d, None);
    assert!(dataset.rows[2].sentiment_7d.is_some());

    let written = dataset_csv::read_dataset(dataset.artifact.as_ref().expect("persisted"))?;
    assert_eq!(written, dataset.rows);

    // AAPL has no metadata in the universe
    let aapl = aligner.build_at("AAPL", 365, now)?.expect("dataset for AAPL");
    assert!(aapl.rows.iter().all(|r| r.sector_name == "unknown"));

    Ok(())
}

#[tokio::test]
async fn test_batch_build_over_price_artifact() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let storage = StorageEnvConfig::with_data_dir(dir.path());
    let scorer: Arc<dyn PolarityScorer> = Arc::new(SentimentScorer::new());

    let service = MarketSnapshotService::new(
        NewsIngester::new(Arc::new(MockNewsProvider::new(vec![article(
            "Pandemic worries ease",
            "2024-01-04 07:00:00",
        )]))),
        PriceSeriesFetcher::new(
            Arc::new(
                MockPriceProvider::new()
                    .with_closes("MSFT", &closes(370.0))
                    .with_closes("JNJ", &closes(160.0))
                    .with_closes("NEWCO", &[(date("2024-01-04"), 10.0)]),
            ),
            2,
        ),
        scorer.clone(),
        ArtifactStore::new(storage.clone()),
    );
    let tickers: Vec<String> = ["MSFT", "JNJ", "NEWCO"].iter().map(|s| s.to_string()).collect();
    service.refresh_prices(Some(&tickers), date("2024-01-01"), true).await?;
    service.refresh_news("general", true).await?;

    let aligner = FeatureAligner::new(storage, Arc::new(SectorSentimentMapper::new(scorer)));
    let summary = aligner.build_all_at(365, at("2024-01-15 18:00:00"))?;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.unavailable, vec!["NEWCO".to_string()]);
    assert!(summary.failed.is_empty());
    Ok(())
}
