//! Application configuration for MineScout.
//!
//! User config lives at `~/.minescout/minescout.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! The file never holds secrets. It names the environment variables that do,
//! and [`ProviderCredentials::from_env`] reads them once at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MineScoutError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "minescout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".minescout";

// ---------------------------------------------------------------------------
// Config structs (matching minescout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Search provider settings.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Per-provider-call timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum research steps in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Where CSV reports are written when no directory is given.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            export_dir: default_export_dir(),
        }
    }
}

impl DefaultsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_concurrency() -> u32 {
    4
}
fn default_export_dir() -> String {
    ".".into()
}

/// `[providers]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub google: GoogleConfig,

    #[serde(default)]
    pub bing: BingConfig,
}

/// `[providers.google]`: Google results through SerpAPI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_google_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_google_endpoint")]
    pub endpoint: String,

    /// Results requested per call.
    #[serde(default = "default_requested")]
    pub num: u32,

    /// Country bias (`gl`).
    #[serde(default = "default_country")]
    pub country: String,

    /// Interface language (`hl`).
    #[serde(default = "default_language")]
    pub language: String,

    /// Results kept from each response.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_google_key_env(),
            endpoint: default_google_endpoint(),
            num: default_requested(),
            country: default_country(),
            language: default_language(),
            max_results: default_max_results(),
        }
    }
}

/// `[providers.bing]`: Bing Web Search v7.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_bing_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_bing_endpoint")]
    pub endpoint: String,

    /// Results requested per call.
    #[serde(default = "default_requested")]
    pub count: u32,

    #[serde(default = "default_market")]
    pub market: String,

    /// Results kept from each response.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for BingConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_bing_key_env(),
            endpoint: default_bing_endpoint(),
            count: default_requested(),
            market: default_market(),
            max_results: default_max_results(),
        }
    }
}

fn default_google_key_env() -> String {
    "SERP_API_KEY".into()
}
fn default_google_endpoint() -> String {
    "https://serpapi.com/search".into()
}
fn default_bing_key_env() -> String {
    "BING_API_KEY".into()
}
fn default_bing_endpoint() -> String {
    "https://api.bing.microsoft.com/v7.0/search".into()
}
fn default_requested() -> u32 {
    10
}
fn default_country() -> String {
    "au".into()
}
fn default_language() -> String {
    "en".into()
}
fn default_market() -> String {
    "en-AU".into()
}
fn default_max_results() -> usize {
    5
}

impl AppConfig {
    /// Reject values that would make every search fail in confusing ways.
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("providers.google.endpoint", &self.providers.google.endpoint),
            ("providers.bing.endpoint", &self.providers.bing.endpoint),
        ] {
            Url::parse(endpoint).map_err(|e| {
                MineScoutError::config(format!("{name} is not a valid URL '{endpoint}': {e}"))
            })?;
        }

        if self.defaults.timeout_secs == 0 {
            return Err(MineScoutError::config("defaults.timeout_secs must be > 0"));
        }
        if self.defaults.concurrency == 0 {
            return Err(MineScoutError::config("defaults.concurrency must be > 0"));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// A provider secret. Renders as `***` so it can never leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key; blank values are treated as absent.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw secret, for placing into a request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("***")
    }
}

/// Provider secrets resolved at process start; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub google: Option<ApiKey>,
    pub bing: Option<ApiKey>,
}

impl ProviderCredentials {
    /// Read the env vars named in the config.
    pub fn from_env(config: &AppConfig) -> Self {
        let read = |var: &str| std::env::var(var).ok().and_then(ApiKey::new);
        let creds = Self {
            google: read(&config.providers.google.api_key_env),
            bing: read(&config.providers.bing.api_key_env),
        };
        tracing::debug!(
            google = creds.google.is_some(),
            bing = creds.bing.is_some(),
            "resolved provider credentials"
        );
        creds
    }

    /// Absence of both keys is valid but must be surfaced to the operator.
    pub fn is_empty(&self) -> bool {
        self.google.is_none() && self.bing.is_none()
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.minescout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MineScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.minescout/minescout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MineScoutError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        MineScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MineScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MineScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MineScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
