/// Configuration management for insta-service
///
/// Loads configuration from environment variables (a `.env` file is read by
/// `main` before this runs).
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    /// `None` when running on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub store_backend: StoreBackend,
    pub log_format: LogFormat,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    pub http_port: u16,
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        matches!(self.env.as_str(), "development" | "dev" | "local")
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Bearer token verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// PEM-encoded RSA public key of the identity provider
    pub jwt_public_key_pem: Option<String>,
    pub jwt_issuer: Option<String>,
}

/// Where uploaded images are written and served from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub root: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

// Default values
fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_or("PORT", 8080),
        };

        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        let database = match store_backend {
            StoreBackend::Postgres => Some(DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL environment variable not set")?,
                max_connections: env_or("DB_MAX_CONNECTIONS", default_max_connections()),
                min_connections: env_or("DB_MIN_CONNECTIONS", default_min_connections()),
                acquire_timeout_secs: env_or(
                    "DB_ACQUIRE_TIMEOUT_SECS",
                    default_acquire_timeout_secs(),
                ),
            }),
            StoreBackend::Memory => None,
        };

        let auth = AuthConfig {
            jwt_public_key_pem: std::env::var("JWT_PUBLIC_KEY_PEM")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            jwt_issuer: std::env::var("JWT_ISSUER").ok(),
        };

        let media = MediaConfig {
            root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string()),
            base_url: std::env::var("MEDIA_BASE_URL").unwrap_or_else(|_| "/media".to_string()),
        };

        let log_format = match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            app,
            database,
            auth,
            media,
            store_backend,
            log_format,
        })
    }
}
