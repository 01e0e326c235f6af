//! Configuration module for delivery-service.

use backoffice_core::config as core_config;
use backoffice_core::error::AppError;
use secrecy::Secret;
use std::env;

#[derive(Debug, Clone)]
pub struct BackofficeConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: Secret<String>,
    pub schema: String,
    pub page_size: usize,
}

impl BackofficeConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "delivery-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            store: StoreConfig {
                url: env::var("STORE_URL").map_err(|_| {
                    AppError::ConfigError(anyhow::anyhow!("STORE_URL is required"))
                })?,
                api_key: Secret::new(env::var("STORE_API_KEY").map_err(|_| {
                    AppError::ConfigError(anyhow::anyhow!("STORE_API_KEY is required"))
                })?),
                schema: env::var("STORE_SCHEMA").unwrap_or_else(|_| "public".to_string()),
                page_size: env::var("STORE_PAGE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            },
        })
    }
}
