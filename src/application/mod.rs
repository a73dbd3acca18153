pub mod bootstrap;
pub mod dataset;
pub mod news_ingester;
pub mod price_fetcher;
pub mod sector_mapper;
pub mod snapshot;
pub mod universe_resolver;

pub use bootstrap::{PipelineBootstrap, PipelineHandle};
pub use dataset::{BatchSummary, FeatureAligner};
pub use news_ingester::NewsIngester;
pub use price_fetcher::PriceSeriesFetcher;
pub use sector_mapper::{HeadlineFeatures, SectorSentimentMapper};
pub use snapshot::{MarketSnapshotService, NewsSnapshot, PriceSnapshot};
pub use universe_resolver::{ResolvedUniverse, TickerUniverseResolver};
