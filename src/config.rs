use std::env;

use anyhow::{bail, Context, Result};

pub const DEFAULT_TAX_RATE_BASIS_POINTS: i64 = 825;
pub const DEFAULT_AI_TIMEOUT_SECONDS: u64 = 30;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub tax_rate_basis_points: i64,
    pub ai_endpoint: Option<String>,
    pub ai_model: String,
    pub ai_api_key: Option<String>,
    pub ai_timeout_seconds: u64,
    pub catalog_endpoint: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let tax_rate_basis_points = match env::var("TAX_RATE_BASIS_POINTS") {
            Ok(raw) => validate_basis_points(
                raw.parse()
                    .context("TAX_RATE_BASIS_POINTS must be an integer")?,
            )?,
            Err(_) => DEFAULT_TAX_RATE_BASIS_POINTS,
        };
        let ai_endpoint = env::var("AI_ENDPOINT").ok();
        let ai_model = env::var("AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let ai_api_key = env::var("AI_API_KEY").ok();
        let ai_timeout_seconds = env::var("AI_TIMEOUT_SECONDS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_AI_TIMEOUT_SECONDS);
        let catalog_endpoint = env::var("CATALOG_ENDPOINT").ok();

        Ok(Self {
            server_host,
            server_port,
            cors_allowed_origin,
            tax_rate_basis_points,
            ai_endpoint,
            ai_model,
            ai_api_key,
            ai_timeout_seconds,
            catalog_endpoint,
        })
    }
}

pub fn validate_basis_points(rate: i64) -> Result<i64> {
    if !(0..=10_000).contains(&rate) {
        bail!("tax rate must be between 0 and 10000 basis points, got {rate}");
    }
    Ok(rate)
}
