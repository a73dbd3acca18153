use crate::domain::errors::IngestError;
use crate::domain::news::NewsArticle;
use crate::domain::ports::NewsProvider;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest_middleware::ClientWithMiddleware;
use rss::Channel;
use std::io::Cursor;
use tracing::{debug, info};

const PROVIDER: &str = "rss";

/// News read from a single RSS 2.0 feed.
///
/// The feed carries no categories; the requested category is ignored.
pub struct RssNewsProvider {
    client: ClientWithMiddleware,
    url: String,
}

impl RssNewsProvider {
    pub fn new(client: ClientWithMiddleware, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// Map feed items to articles. Items without a parseable RFC-2822 `pubDate`
/// are dropped, since they cannot be placed on a date.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<NewsArticle>, IngestError> {
    let channel = Channel::read_from(Cursor::new(bytes))
        .map_err(|e| IngestError::parse_failure(PROVIDER, e))?;

    let source = channel.title().to_string();
    let articles = channel
        .items()
        .iter()
        .filter_map(|item| {
            let published_at = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())?
                .naive_utc();
            Some(NewsArticle {
                headline: item.title().unwrap_or_default().to_string(),
                summary: item.description().unwrap_or_default().to_string(),
                source: source.clone(),
                published_at,
            })
        })
        .collect();

    Ok(articles)
}

#[async_trait]
impl NewsProvider for RssNewsProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn market_news(&self, category: &str) -> Result<Vec<NewsArticle>, IngestError> {
        debug!("Fetching RSS feed {} (category '{}' ignored)", self.url, category);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| IngestError::source_unavailable(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(IngestError::source_unavailable(
                PROVIDER,
                format!("HTTP {}", response.status()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IngestError::source_unavailable(PROVIDER, e))?;

        let articles = parse_feed(&bytes)?;
        info!("RSS feed returned {} articles", articles.len());
        Ok(articles)
    }
}
