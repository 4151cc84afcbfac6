//! Configuration module for the Cookio backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Page size used by the listing endpoint when the client sends none.
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for a single listing page.
const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Page size applied when `size` is missing from a listing request
    pub default_page_size: u32,
    /// Largest page size a client may request
    pub max_page_size: u32,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("COOKIO_API_PSK").ok();

        let db_path = env::var("COOKIO_DB_PATH")
            .unwrap_or_else(|_| "./data/cookio.sqlite".to_string())
            .into();

        let bind_addr = env::var("COOKIO_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid COOKIO_BIND_ADDR format");

        let log_level = env::var("COOKIO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_page_size = parse_u32("COOKIO_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE);
        let max_page_size = parse_u32("COOKIO_MAX_PAGE_SIZE", DEFAULT_MAX_PAGE_SIZE);

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            default_page_size: default_page_size.min(max_page_size),
            max_page_size,
        }
    }
}

fn parse_u32(key: &str, default: u32) -> u32 {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("Invalid {} value: {}", key, raw)),
        Err(_) => default,
    }
}
