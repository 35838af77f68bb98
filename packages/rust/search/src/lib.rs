//! Web search providers and ordered provider fallback.
//!
//! Every provider exposes the same capability, [`SearchProvider::search`], and
//! always answers with a [`SearchOutcome`]: failures are values, never errors.
//! The [`SearchOrchestrator`] tries the configured providers in priority order
//! (Google before Bing) and returns the first success.

mod bing;
mod google;
mod orchestrator;

use std::time::Duration;

use async_trait::async_trait;
use minescout_shared::{MineScoutError, Result, SearchFailure, SearchOutcome};
use reqwest::Client;

pub use bing::BingProvider;
pub use google::GoogleProvider;
pub use orchestrator::{ProviderStatus, SearchOrchestrator, provider_statuses};

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("MineScout/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow on a search API call.
const MAX_REDIRECTS: usize = 3;

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A web search API integration.
///
/// Implementations make exactly one outbound attempt per call (no retries) and
/// must give up once `timeout` has elapsed.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short display name, e.g. `"Google"`.
    fn name(&self) -> &'static str;

    /// Run one search.
    async fn search(&self, query: &str, timeout: Duration) -> SearchOutcome;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| MineScoutError::Network(format!("failed to build HTTP client: {e}")))
}

/// Turn a reqwest error into a failure reason.
///
/// The URL is stripped first: SerpAPI carries its key in the query string.
fn transport_failure(provider: &'static str, err: reqwest::Error, timeout: Duration) -> SearchFailure {
    if err.is_timeout() {
        return SearchFailure::Timeout {
            provider,
            after: timeout,
        };
    }
    SearchFailure::Transport {
        provider,
        message: err.without_url().to_string(),
    }
}

/// Send a prepared request and hand back the body of a 200 response.
async fn fetch_body(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    timeout: Duration,
) -> std::result::Result<String, SearchFailure> {
    let response = request
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_failure(provider, e, timeout))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(SearchFailure::Http {
            provider,
            status: status.as_u16(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| transport_failure(provider, e, timeout))
}

/// Decode a JSON body into the provider's wire type.
fn decode<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> std::result::Result<T, SearchFailure> {
    serde_json::from_str(body).map_err(|e| SearchFailure::Decode {
        provider,
        message: e.to_string(),
    })
}
