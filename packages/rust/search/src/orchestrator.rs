//! Ordered provider fallback.

use std::time::Duration;

use minescout_shared::{AppConfig, ProviderCredentials, Result, SearchFailure, SearchOutcome};
use tracing::{debug, info, instrument, warn};

use crate::{BingProvider, GoogleProvider, SearchProvider};

/// Whether a provider has credentials, for operator display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderStatus {
    pub name: &'static str,
    /// Environment variable the key is read from.
    pub api_key_env: String,
    pub configured: bool,
}

/// Report every known provider in priority order.
pub fn provider_statuses(config: &AppConfig, credentials: &ProviderCredentials) -> Vec<ProviderStatus> {
    vec![
        ProviderStatus {
            name: "Google",
            api_key_env: config.providers.google.api_key_env.clone(),
            configured: credentials.google.is_some(),
        },
        ProviderStatus {
            name: "Bing",
            api_key_env: config.providers.bing.api_key_env.clone(),
            configured: credentials.bing.is_some(),
        },
    ]
}

/// Tries providers strictly one after another and returns the first success.
pub struct SearchOrchestrator {
    providers: Vec<Box<dyn SearchProvider>>,
    timeout: Duration,
}

impl SearchOrchestrator {
    /// Use an explicit provider list; order is priority order.
    pub fn new(providers: Vec<Box<dyn SearchProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Register the providers that have credentials, Google before Bing.
    pub fn from_config(config: &AppConfig, credentials: &ProviderCredentials) -> Result<Self> {
        let mut providers: Vec<Box<dyn SearchProvider>> = Vec::new();

        if let Some(key) = &credentials.google {
            providers.push(Box::new(GoogleProvider::new(
                config.providers.google.clone(),
                Some(key.clone()),
            )?));
        }
        if let Some(key) = &credentials.bing {
            providers.push(Box::new(BingProvider::new(
                config.providers.bing.clone(),
                Some(key.clone()),
            )?));
        }

        if providers.is_empty() {
            warn!("no search provider has credentials; every search will fail");
        }

        Ok(Self::new(providers, config.defaults.timeout()))
    }

    /// Names of the eligible providers, in the order they are tried.
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Search with fallback. Never fails: the worst case is an aggregated
    /// [`SearchFailure::NoWorkingProvider`] carrying the untouched query.
    #[instrument(skip_all, fields(providers = self.providers.len()))]
    pub async fn run(&self, query: &str) -> SearchOutcome {
        info!(%query, "searching");

        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let name = provider.name();
            let outcome = match tokio::time::timeout(self.timeout, provider.search(query, self.timeout)).await {
                Ok(outcome) => outcome,
                Err(_) => SearchOutcome::err(
                    query,
                    SearchFailure::Timeout {
                        provider: name,
                        after: self.timeout,
                    },
                ),
            };

            match outcome {
                SearchOutcome::Ok { results, .. } => {
                    debug!(provider = name, results = results.len(), "provider answered");
                    return SearchOutcome::ok(query, results);
                }
                SearchOutcome::Err { failure, .. } => {
                    debug!(provider = name, reason = %failure, "provider failed, falling back");
                    attempts.push(failure);
                }
            }
        }

        warn!(attempted = attempts.len(), "no search provider produced results");
        SearchOutcome::err(query, SearchFailure::NoWorkingProvider { attempts })
    }
}
