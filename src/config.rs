use crate::error::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
    pub analytics: AnalyticsConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
        }
    }
}

/// Where the database lives. A `libsql://`, `http(s)://` or `wss://` url is
/// treated as a remote Turso database and needs an auth token; anything else
/// is a local file path.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "data/justoo.db".to_string(),
            auth_token: None,
        }
    }
}

impl DatabaseConfig {
    pub fn is_remote(&self) -> bool {
        ["libsql://", "http://", "https://", "wss://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// An item is overstocked once quantity exceeds min stock level times this.
    pub overstock_multiplier: i64,
    pub top_items_limit: u32,
    pub price_extremes_limit: u32,
    pub slow_movers_limit: u32,
    pub trend_days: u32,
    /// Window for counting newly registered riders.
    pub recent_rider_days: u32,
    pub price_bands: PriceBandConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            overstock_multiplier: 5,
            top_items_limit: 10,
            price_extremes_limit: 5,
            slow_movers_limit: 10,
            trend_days: 30,
            recent_rider_days: 30,
            price_bands: PriceBandConfig::default(),
        }
    }
}

/// Inclusive upper bounds (in major currency units) of every band but the
/// last; the last band is open-ended.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceBandConfig {
    pub currency_symbol: String,
    pub upper_bounds: Vec<i64>,
}

impl Default for PriceBandConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            upper_bounds: vec![100, 500, 2000],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 9898,
        }
    }
}

impl Config {
    /// Read `path` if it exists (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            Self::from_toml(&content)?
        } else {
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = env::var("LIBSQL_URL") {
            self.database.url = url;
        }
        if let Ok(token) = env::var("LIBSQL_AUTH_TOKEN") {
            self.database.auth_token = Some(token);
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Ok(port) = env::var("METRICS_PORT") {
            self.metrics.port = port.parse().map_err(|_| {
                AppError::Config(format!("METRICS_PORT is not a valid port: {port}"))
            })?;
            self.metrics.enabled = true;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pagination.default_limit == 0 || self.pagination.max_limit == 0 {
            return Err(AppError::Config(
                "pagination limits must be at least 1".to_string(),
            ));
        }
        if self.pagination.default_limit > self.pagination.max_limit {
            return Err(AppError::Config(
                "pagination.default_limit cannot exceed pagination.max_limit".to_string(),
            ));
        }
        if self.analytics.overstock_multiplier < 1 {
            return Err(AppError::Config(
                "analytics.overstock_multiplier must be at least 1".to_string(),
            ));
        }

        let bounds = &self.analytics.price_bands.upper_bounds;
        if bounds.is_empty() {
            return Err(AppError::Config(
                "analytics.price_bands.upper_bounds needs at least one bound".to_string(),
            ));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) || bounds[0] <= 0 {
            return Err(AppError::Config(
                "analytics.price_bands.upper_bounds must be positive and strictly increasing"
                    .to_string(),
            ));
        }

        if self.database.is_remote() && self.database.auth_token.is_none() {
            return Err(AppError::Config(
                "LIBSQL_AUTH_TOKEN is required for a remote database".to_string(),
            ));
        }
        Ok(())
    }
}
