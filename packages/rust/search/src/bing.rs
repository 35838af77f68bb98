//! Bing Web Search v7 provider.

use std::time::Duration;

use async_trait::async_trait;
use minescout_shared::{ApiKey, BingConfig, Result, SearchFailure, SearchOutcome, SearchResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{SearchProvider, build_client, decode, fetch_body};

const NAME: &str = "Bing";

/// Header carrying the subscription key.
const KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingResponse {
    #[serde(default)]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingWebPage>,
}

#[derive(Debug, Deserialize)]
struct BingWebPage {
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    snippet: String,
}

/// Bing search provider; authenticates with a subscription-key header.
pub struct BingProvider {
    config: BingConfig,
    api_key: Option<ApiKey>,
    client: Client,
}

impl BingProvider {
    pub fn new(config: BingConfig, api_key: Option<ApiKey>) -> Result<Self> {
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

        let count = self.config.count.to_string();
        let request = self
            .client
            .get(&self.config.endpoint)
            .header(KEY_HEADER, api_key.expose())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("mkt", self.config.market.as_str()),
                ("responseFilter", "Webpages"),
            ]);

        let body = fetch_body(NAME, request, timeout).await?;
        let parsed: BingResponse = decode(NAME, &body)?;

        Ok(parsed
            .web_pages
            .map(|pages| pages.value)
            .unwrap_or_default()
            .into_iter()
            .take(self.config.max_results)
            .map(|page| SearchResult {
                title: page.name,
                link: page.url,
                snippet: page.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for BingProvider {
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
