//! Shared types, error model, and configuration for MineScout.
//!
//! This crate is the foundation depended on by all other MineScout crates.
//! It provides:
//! - The unified error type ([`MineScoutError`])
//! - Domain types ([`ProjectIdentity`], [`SearchResult`], [`SearchOutcome`], [`SearchFailure`])
//! - Configuration ([`AppConfig`], [`ProviderCredentials`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiKey, AppConfig, BingConfig, DefaultsConfig, GoogleConfig, ProviderCredentials,
    ProvidersConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{MineScoutError, Result};
pub use types::{ProjectIdentity, SearchFailure, SearchOutcome, SearchResult};
