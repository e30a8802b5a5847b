//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::DEFAULT_SETTLEMENT_EPSILON;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Ledger computation settings.
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Record store settings.
    #[serde(default)]
    pub store: StoreSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Ledger computation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// Balances at or below this magnitude are treated as settled.
    #[serde(default = "default_settlement_epsilon")]
    pub settlement_epsilon: Decimal,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            settlement_epsilon: default_settlement_epsilon(),
        }
    }
}

fn default_settlement_epsilon() -> Decimal {
    DEFAULT_SETTLEMENT_EPSILON
}

/// Record store settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    /// Optional JSON fixture loaded into the in-memory store at startup.
    pub seed_file: Option<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or
    /// `ledger.settlement_epsilon` is negative.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SPLITLEDGER").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        if config.ledger.settlement_epsilon < Decimal::ZERO {
            return Err(config::ConfigError::Message(format!(
                "ledger.settlement_epsilon must not be negative (got {})",
                config.ledger.settlement_epsilon
            )));
        }
        Ok(config)
    }
}
