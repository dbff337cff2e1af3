use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub gateway: GatewayConfig,
}

/// Settings for the Zarinpal payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub merchant_id: String,
    pub sandbox: bool,
    pub callback_url: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        Ok(Self {
            port,
            database_url,
            host,
            db_max_connections,
            gateway: GatewayConfig::from_env()?,
        })
    }
}

impl GatewayConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let merchant_id =
            env::var("ZARINPAL_MERCHANT_ID").context("ZARINPAL_MERCHANT_ID is not set")?;
        let callback_url =
            env::var("PAYMENT_CALLBACK_URL").context("PAYMENT_CALLBACK_URL is not set")?;
        let sandbox = env::var("ZARINPAL_SANDBOX")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let timeout_secs = env::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);
        Ok(Self {
            merchant_id,
            sandbox,
            callback_url,
            timeout_secs,
        })
    }
}
