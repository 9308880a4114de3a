//! Application configuration loaded from environment variables.

use domain::RestockPolicy;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `"0.0.0.0"`)
/// - `PORT`: listen port (default `3000`)
/// - `RUST_LOG`: tracing filter directive (default `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset means the in-memory store
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default `10`)
/// - `ADMIN_TOKEN`: enables the `/admin` routes when set
/// - `RESTOCK_ON_CANCEL`: return stock when an order is cancelled (default `false`)
/// - `RESTOCK_ON_RETURN`: return stock when a return is approved (default `true`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub admin_token: Option<String>,
    pub restock_on_cancel: bool,
    pub restock_on_return: bool,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: non_empty("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.database_max_connections),
            admin_token: non_empty("ADMIN_TOKEN"),
            restock_on_cancel: non_empty("RESTOCK_ON_CANCEL")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.restock_on_cancel),
            restock_on_return: non_empty("RESTOCK_ON_RETURN")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.restock_on_return),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn restock_policy(&self) -> RestockPolicy {
        RestockPolicy {
            on_cancel: self.restock_on_cancel,
            on_return: self.restock_on_return,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let policy = RestockPolicy::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 10,
            admin_token: None,
            restock_on_cancel: policy.on_cancel,
            restock_on_return: policy.on_return,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
