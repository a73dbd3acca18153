pub mod finnhub;
pub mod rss;
pub mod sentiment_analyzer;

pub use self::finnhub::FinnhubNewsProvider;
pub use self::rss::RssNewsProvider;
pub use self::sentiment_analyzer::SentimentScorer;
