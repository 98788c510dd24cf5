//! Configuration management for Bookshelf.
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present) into a process-wide instance.

use std::env;
use std::sync::OnceLock;

use tracing::warn;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base used for absolute links in responses (pagination cursors, API root).
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Token provisioned for an `admin` user at startup.
    pub bootstrap_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port: parse_or("PORT", 8000),
                public_url: env_or("PUBLIC_URL", "http://localhost:8000")
                    .trim_end_matches('/')
                    .to_string(),
            },
            database: DatabaseConfig {
                path: env_or("DATABASE_PATH", "./data/bookshelf.db"),
            },
            auth: AuthConfig {
                bootstrap_token: env::var("ADMIN_BOOTSTRAP_TOKEN")
                    .ok()
                    .filter(|t| !t.is_empty()),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {}={:?}, using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
