//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local runs.

use crate::db::sheets::DEFAULT_SHEETS_API_BASE;
use crate::services::dispatcher::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};
use crate::services::telegram::DEFAULT_TELEGRAM_API_BASE;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_WORKSHEET: &str = "CHAT";

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Secrets ---
    /// Telegram bot token
    pub bot_token: String,
    /// Raw service-account JSON, validated separately
    pub google_credentials: String,

    // --- Row store ---
    /// Spreadsheet key
    pub sheet_id: String,
    /// Worksheet (tab) name
    pub worksheet: String,
    pub sheets_api_base: String,

    // --- Transport ---
    pub telegram_api_base: String,

    // --- Runtime ---
    /// Liveness server port
    pub port: u16,
    pub worker_count: usize,
    pub queue_capacity: usize,
    /// Timeout for outbound calls to the row store and Telegram
    pub http_timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("google_credentials", &"<redacted>")
            .field("sheet_id", &self.sheet_id)
            .field("worksheet", &self.worksheet)
            .field("sheets_api_base", &self.sheets_api_base)
            .field("telegram_api_base", &self.telegram_api_base)
            .field("port", &self.port)
            .field("worker_count", &self.worker_count)
            .field("queue_capacity", &self.queue_capacity)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            bot_token: "test-bot-token".to_string(),
            google_credentials: "{}".to_string(),
            sheet_id: "test-sheet".to_string(),
            worksheet: DEFAULT_WORKSHEET.to_string(),
            sheets_api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            telegram_api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            port: 8080,
            worker_count: DEFAULT_WORKER_COUNT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            http_timeout: Duration::from_secs(30),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            google_credentials: required("GOOGLE_CREDENTIALS")?,
            sheet_id: required("SHEET_ID")?,
            worksheet: optional("WORKSHEET_NAME").unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
            sheets_api_base: optional("SHEETS_API_BASE")
                .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string()),
            telegram_api_base: optional("TELEGRAM_API_BASE")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            port: parsed("PORT", 8080)?,
            worker_count: parsed("WORKER_COUNT", DEFAULT_WORKER_COUNT)?,
            queue_capacity: parsed("QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
            http_timeout: Duration::from_secs(parsed("HTTP_TIMEOUT_SECS", 30)?),
        })
    }
}

/// Trimmed value, or `None` if unset or blank.
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
