use std::env;

use log::*;

const DEFAULT_MSP_HOST: &str = "127.0.0.1";
const DEFAULT_MSP_PORT: u16 = 8380;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/marketplace.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Shared secret guarding the admin-only routes (status transitions, order search). `None` disables
    /// those routes entirely; authentication proper is handled by an upstream service.
    pub admin_api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MSP_HOST.to_string(),
            port: DEFAULT_MSP_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            admin_api_key: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MSP_HOST").ok().unwrap_or_else(|| DEFAULT_MSP_HOST.into());
        let port = env::var("MSP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MSP_PORT. {e} Using the default, {DEFAULT_MSP_PORT}, instead."
                    );
                    DEFAULT_MSP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MSP_PORT);
        let database_url = env::var("MSP_DATABASE_URL").unwrap_or_else(|_| {
            info!("🪛️ MSP_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let admin_api_key = env::var("MSP_ADMIN_API_KEY").ok().filter(|k| !k.is_empty());
        if admin_api_key.is_none() {
            warn!("🪛️ MSP_ADMIN_API_KEY is not set. The admin routes are disabled until one is configured.");
        }
        Self { host, port, database_url, admin_api_key }
    }
}
