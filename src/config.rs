use std::env;

use anyhow::{Context, Result};
use url::Url;

use crate::db::DEFAULT_MAX_POOL_SIZE;

pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub chat_service_port: u16,
    pub task_service_port: u16,
    pub user_service_url: String,
    pub file_service_url: String,
    pub chat_service_url: String,
    pub notification_service_url: Option<String>,
    pub gateway_timeout_secs: u64,
    pub cors_allowed_origin: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let chat_service_port = env::var("CHAT_SERVICE_PORT")
            .unwrap_or_else(|_| "8083".to_string())
            .parse()
            .context("CHAT_SERVICE_PORT must be a valid u16")?;
        let task_service_port = env::var("TASK_SERVICE_PORT")
            .unwrap_or_else(|_| "8084".to_string())
            .parse()
            .context("TASK_SERVICE_PORT must be a valid u16")?;
        let user_service_url = service_url("USER_SERVICE_URL", "http://localhost:8082")?;
        let file_service_url = service_url("FILE_SERVICE_URL", "http://localhost:8080")?;
        let chat_service_url = service_url("CHAT_SERVICE_URL", "http://localhost:8083")?;
        let notification_service_url = env::var("NOTIFICATION_SERVICE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let gateway_timeout_secs = env::var("GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_GATEWAY_TIMEOUT_SECS.to_string())
            .parse()
            .context("GATEWAY_TIMEOUT_SECS must be an integer")?;
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            chat_service_port,
            task_service_port,
            user_service_url,
            file_service_url,
            chat_service_url,
            notification_service_url,
            gateway_timeout_secs,
            cors_allowed_origin,
        })
    }

    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

fn service_url(key: &str, default: &str) -> Result<String> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).with_context(|| format!("{key} must be a valid URL"))?;
    Ok(raw.trim_end_matches('/').to_string())
}

fn redact_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("*****"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
