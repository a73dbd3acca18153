use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use url::Url;

/// Browser-like agent; both scraped sites reject the default reqwest agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates a new HTTP client with retry middleware.
    ///
    /// The request timeout is the only bound on a stuck upstream call.
    pub fn create_client(timeout_secs: u64, max_retries: u32) -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

        let client = Client::builder()
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }
}

/// Append query parameters to a base URL, percent-encoding keys and values.
///
/// reqwest-middleware's request builder has no `.query()`, so URLs are built
/// up front. Falls back to the unmodified base when it does not parse.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return base_url.to_string();
    }

    match Url::parse(base_url) {
        Ok(mut url) => {
            {
                let mut pairs = url.query_pairs_mut();
                for (k, v) in params {
                    pairs.append_pair(k.as_ref(), v.as_ref());
                }
            }
            url.to_string()
        }
        Err(_) => base_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_query_encodes() {
        let url = build_url_with_query(
            "https://finnhub.io/api/v1/news",
            &[("category", "general"), ("token", "a b&c")],
        );
        assert_eq!(
            url,
            "https://finnhub.io/api/v1/news?category=general&token=a+b%26c"
        );
    }

    #[test]
    fn test_build_url_appends_to_existing_query() {
        let url = build_url_with_query("https://x.test/p?a=1", &[("b", "2")]);
        assert_eq!(url, "https://x.test/p?a=1&b=2");
    }

    #[test]
    fn test_build_url_without_params() {
        assert_eq!(
            build_url_with_query::<&str, &str>("https://x.test/p", &[]),
            "https://x.test/p"
        );
    }
}
