use crate::config::FinnhubConfig;
use crate::domain::errors::IngestError;
use crate::domain::news::NewsArticle;
use crate::domain::ports::NewsProvider;
use crate::infrastructure::http_client_factory::build_url_with_query;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info, warn};

const PROVIDER: &str = "finnhub";

/// One item of Finnhub's `/news` response. Only the fields the pipeline keeps
/// are deserialized.
#[derive(Debug, Deserialize)]
pub(crate) struct FinnhubNewsItem {
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    source: String,
    datetime: i64,
}

/// Market news from Finnhub's category feed.
///
/// Construction fails with `ProviderUnavailable` when no usable API key is
/// configured, so a missing key is never mistaken for an empty feed.
pub struct FinnhubNewsProvider {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl FinnhubNewsProvider {
    pub fn from_config(
        client: ClientWithMiddleware,
        config: &FinnhubConfig,
    ) -> Result<Self, IngestError> {
        if !config.has_usable_key() {
            return Err(IngestError::ProviderUnavailable {
                provider: PROVIDER.to_string(),
                reason: "FINNHUB_API_KEY is not set".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
        })
    }
}

pub(crate) fn into_articles(items: Vec<FinnhubNewsItem>) -> Vec<NewsArticle> {
    let total = items.len();
    let articles: Vec<NewsArticle> = items
        .into_iter()
        .filter_map(|item| {
            let published_at = DateTime::from_timestamp(item.datetime, 0)?.naive_utc();
            Some(NewsArticle {
                headline: item.headline,
                summary: item.summary,
                source: item.source,
                published_at,
            })
        })
        .collect();

    if articles.len() < total {
        warn!(
            "Dropped {} Finnhub items with out-of-range timestamps",
            total - articles.len()
        );
    }
    articles
}

#[async_trait]
impl NewsProvider for FinnhubNewsProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn market_news(&self, category: &str) -> Result<Vec<NewsArticle>, IngestError> {
        let url = build_url_with_query(
            &format!("{}/news", self.base_url),
            &[
                ("category", category),
                ("minId", "0"),
                ("token", self.api_key.as_str()),
            ],
        );
        debug!("Requesting Finnhub news for category '{}'", category);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| IngestError::source_unavailable(PROVIDER, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(IngestError::ProviderUnavailable {
                provider: PROVIDER.to_string(),
                reason: format!("API key rejected (HTTP {})", status),
            });
        }
        if !status.is_success() {
            return Err(IngestError::source_unavailable(
                PROVIDER,
                format!("HTTP {}", status),
            ));
        }

        let items: Vec<FinnhubNewsItem> = response
            .json()
            .await
            .map_err(|e| IngestError::parse_failure(PROVIDER, e))?;

        let articles = into_articles(items);
        info!("Finnhub returned {} '{}' articles", articles.len(), category);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client_factory::HttpClientFactory;
    use chrono::NaiveDate;

    #[test]
    fn test_missing_key_is_provider_unavailable() {
        let client = HttpClientFactory::create_client(5, 0);
        let err = FinnhubNewsProvider::from_config(client, &FinnhubConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, IngestError::ProviderUnavailable { .. }));
    }

    #[test]
    fn test_placeholder_key_is_provider_unavailable() {
        let client = HttpClientFactory::create_client(5, 0);
        let config = FinnhubConfig {
            api_key: crate::config::FINNHUB_KEY_PLACEHOLDER.to_string(),
            ..FinnhubConfig::default()
        };
        assert!(FinnhubNewsProvider::from_config(client, &config).is_err());
    }

    #[test]
    fn test_response_mapping() {
        let json = r#"[
            {"category":"top news","datetime":1704292200,"headline":"Stocks rise",
             "id":1,"image":"","related":"","source":"Reuters","summary":"Gains broad","url":"u"},
            {"category":"top news","datetime":1704378600,"headline":"Oil slips",
             "id":2,"image":"","related":"","source":"CNBC","url":"u"}
        ]"#;
        let items: Vec<FinnhubNewsItem> = serde_json::from_str(json).unwrap();
        let articles = into_articles(items);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].headline, "Stocks rise");
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(
            articles[0].published_at,
            NaiveDate::from_ymd_opt(2024, 1, 3)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap()
        );
        assert_eq!(articles[1].summary, "");
    }
}
