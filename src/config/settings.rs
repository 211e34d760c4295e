//! Runtime settings read from the environment (after `.env` has been loaded).

use super::database::get_database_url;
use std::net::SocketAddr;
use tracing::warn;

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Settings needed to run the storefront service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// `DATABASE_URL`
    pub database_url: String,
    /// `STOREFRONT_BIND`
    pub bind_addr: SocketAddr,
    /// `STOREFRONT_PUBLIC_URL`, base for payment-gateway callback URLs
    pub public_url: String,
    /// `STOREFRONT_CONFIG`, path of the seed catalog file
    pub config_path: String,
}

impl Settings {
    /// Reads settings from environment variables, falling back to defaults.
    ///
    /// An unparsable `STOREFRONT_BIND` is reported and replaced by the default.
    #[must_use]
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("STOREFRONT_BIND")
            .ok()
            .and_then(|raw| {
                raw.parse()
                    .inspect_err(|e| warn!("Ignoring invalid STOREFRONT_BIND '{}': {}", raw, e))
                    .ok()
            })
            .unwrap_or_else(default_bind);

        let public_url = std::env::var("STOREFRONT_PUBLIC_URL")
            .unwrap_or_else(|_| DEFAULT_PUBLIC_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            database_url: get_database_url(),
            bind_addr,
            public_url,
            config_path: std::env::var("STOREFRONT_CONFIG")
                .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string()),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
