//! Google web results via SerpAPI.

use std::time::Duration;

use async_trait::async_trait;
use minescout_shared::{ApiKey, GoogleConfig, Result, SearchFailure, SearchOutcome, SearchResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{SearchProvider, build_client, decode, fetch_body};

const NAME: &str = "Google";

/// SerpAPI response, reduced to the fields we read.
#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SerpApiResult>,
}

#[derive(Debug, Deserialize)]
struct SerpApiResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Google search provider (SerpAPI `engine=google`).
pub struct GoogleProvider {
    config: GoogleConfig,
    api_key: Option<ApiKey>,
    client: Client,
}

impl GoogleProvider {
    /// Create a provider. A missing key is allowed; searches then fail with
    /// [`SearchFailure::ConfigMissing`] without touching the network.
    pub fn new(config: GoogleConfig, api_key: Option<ApiKey>) -> Result<Self> {
        Ok(Self {
            config,
            api_key,
            client: build_client()?,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, query: &str, timeout: Duration) -> std::result::Result<Vec<SearchResult>, SearchFailure> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(SearchFailure::ConfigMissing { provider: NAME })?;

        let num = self.config.num.to_string();
        let request = self.client.get(&self.config.endpoint).query(&[
            ("q", query),
            ("api_key", api_key.expose()),
            ("engine", "google"),
            ("num", num.as_str()),
            ("gl", self.config.country.as_str()),
            ("hl", self.config.language.as_str()),
        ]);

        let body = fetch_body(NAME, request, timeout).await?;
        let parsed: SerpApiResponse = decode(NAME, &body)?;

        Ok(parsed
            .organic_results
            .into_iter()
            .take(self.config.max_results)
            .map(|r| SearchResult {
                title: r.title,
                link: r.link,
                snippet: r.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME))]
    async fn search(&self, query: &str, timeout: Duration) -> SearchOutcome {
        match self.fetch(query, timeout).await {
            Ok(results) => {
                debug!(results = results.len(), "search succeeded");
                SearchOutcome::ok(query, results)
            }
            Err(failure) => {
                warn!(reason = %failure, "search failed");
                SearchOutcome::err(query, failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> GoogleConfig {
        GoogleConfig {
            endpoint: format!("{}/search", server.uri()),
            ..GoogleConfig::default()
        }
    }

    fn organic(n: usize) -> serde_json::Value {
        let results: Vec<_> = (1..=n)
            .map(|i| {
                serde_json::json!({
                    "position": i,
                    "title": format!("Result {i}"),
                    "link": format!("https://example.com/{i}"),
                    "snippet": format!("Snippet {i}"),
                })
            })
            .collect();
        serde_json::json!({ "organic_results": results })
    }

    #[tokio::test]
    async fn test_maps_top_five_organic_results() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Saturn Metals Apollo Hill"))
            .and(query_param("api_key", "serp-test"))
            .and(query_param("engine", "google"))
            .and(query_param("num", "10"))
            .and(query_param("gl", "au"))
            .and(query_param("hl", "en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(organic(8)))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(&server), ApiKey::new("serp-test")).unwrap();
        let outcome = provider
            .search("Saturn Metals Apollo Hill", Duration::from_secs(5))
            .await;

        assert!(outcome.is_ok(), "unexpected failure: {:?}", outcome.reason());
        assert_eq!(outcome.query(), "Saturn Metals Apollo Hill");
        let results = outcome.results();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].title, "Result 1");
        assert_eq!(results[4].link, "https://example.com/5");
        assert_eq!(results[2].snippet, "Snippet 3");
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organic_results": [{ "title": "Only a title" }]
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(&server), ApiKey::new("k")).unwrap();
        let outcome = provider.search("q", Duration::from_secs(5)).await;

        assert_eq!(
            outcome.results(),
            &[SearchResult {
                title: "Only a title".into(),
                link: String::new(),
                snippet: String::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_no_organic_results_is_empty_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "search_metadata": { "status": "Success" }
            })))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(&server), ApiKey::new("k")).unwrap();
        let outcome = provider.search("q", Duration::from_secs(5)).await;

        assert!(outcome.is_ok());
        assert!(outcome.results().is_empty());
    }

    #[tokio::test]
    async fn test_non_200_is_http_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(&server), ApiKey::new("bad")).unwrap();
        let outcome = provider.search("original query", Duration::from_secs(5)).await;

        assert_eq!(outcome.query(), "original query");
        assert_eq!(
            outcome.failure(),
            Some(&SearchFailure::Http {
                provider: "Google",
                status: 401
            })
        );
    }

    #[tokio::test]
    async fn test_missing_key_never_calls_api() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(organic(1)))
            .expect(0)
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(&server), None).unwrap();
        assert!(!provider.is_configured());

        let outcome = provider.search("q", Duration::from_secs(5)).await;
        assert_eq!(
            outcome.failure(),
            Some(&SearchFailure::ConfigMissing { provider: "Google" })
        );
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(organic(1))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(&server), ApiKey::new("k")).unwrap();
        let outcome = provider.search("q", Duration::from_millis(100)).await;

        assert!(matches!(
            outcome.failure(),
            Some(SearchFailure::Timeout { provider: "Google", .. })
        ));
    }

    #[tokio::test]
    async fn test_garbage_body_is_decode_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
            .mount(&server)
            .await;

        let provider = GoogleProvider::new(config_for(&server), ApiKey::new("k")).unwrap();
        let outcome = provider.search("q", Duration::from_secs(5)).await;

        assert!(matches!(
            outcome.failure(),
            Some(SearchFailure::Decode { provider: "Google", .. })
        ));
    }

    #[tokio::test]
    async fn test_transport_error_hides_key() {
        // Nothing listens on port 9 on test machines; the connection is refused.
        let config = GoogleConfig {
            endpoint: "http://127.0.0.1:9/search".into(),
            ..GoogleConfig::default()
        };
        let provider = GoogleProvider::new(config, ApiKey::new("super-secret-key")).unwrap();
        let outcome = provider.search("q", Duration::from_secs(5)).await;

        let reason = outcome.reason().expect("should fail");
        assert!(!reason.contains("super-secret-key"), "key leaked: {reason}");
        assert!(!outcome.is_ok());
    }
}
