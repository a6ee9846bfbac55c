use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub database: DatabaseConfig,
    pub sessions: SessionBackend,
    pub logging: LoggingConfig,
    pub request: RequestConfig,
}

/// Hosted model API configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Local database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Where saved sessions live
#[derive(Debug, Clone, PartialEq)]
pub enum SessionBackend {
    /// The local SQLite database
    Sqlite,
    /// A hosted PostgREST table
    Hosted(HostedTableConfig),
}

/// Hosted table API configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HostedTableConfig {
    pub url: String,
    pub api_key: String,
    pub table: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub retry_jitter_ms: u64,
}

pub const DEFAULT_MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

impl Config {
    /// Load configuration from environment variables
    ///
    /// Fails without a model API key.
    pub fn from_env() -> Result<Self, AppError> {
        let config = Self::from_env_offline()?;
        config.require_model()?;
        Ok(config)
    }

    /// Load configuration for commands that never call the model.
    ///
    /// The API key may be absent, in which case it is left empty.
    pub fn from_env_offline() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_default();

        let model = ModelConfig {
            api_key,
            base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MODEL_BASE_URL.to_string()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        };

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/facilitator.db".to_string()),
            ),
            max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
        };

        let sessions = match env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "sqlite".to_string())
            .to_lowercase()
            .as_str()
        {
            "hosted" | "supabase" => SessionBackend::Hosted(HostedTableConfig {
                url: required("SUPABASE_URL")?,
                api_key: required("SUPABASE_ANON_KEY")?,
                table: env::var("SESSIONS_TABLE").unwrap_or_else(|_| "sessions".to_string()),
            }),
            "sqlite" => SessionBackend::Sqlite,
            other => {
                return Err(AppError::Config {
                    message: format!("Unknown SESSION_BACKEND '{}' (expected sqlite or hosted)", other),
                })
            }
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let defaults = RequestConfig::default();
        let request = RequestConfig {
            timeout_ms: parse_env("REQUEST_TIMEOUT_MS", defaults.timeout_ms),
            max_retries: parse_env("MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: parse_env("RETRY_DELAY_MS", defaults.retry_delay_ms),
            retry_jitter_ms: parse_env("RETRY_JITTER_MS", defaults.retry_jitter_ms),
        };

        Ok(Config {
            model,
            database,
            sessions,
            logging,
            request,
        })
    }
}

impl Config {
    /// Check that the model API key is present
    pub fn require_model(&self) -> Result<&ModelConfig, AppError> {
        if self.model.api_key.trim().is_empty() {
            return Err(AppError::Config {
                message: "GEMINI_API_KEY (or API_KEY) is required".to_string(),
            });
        }
        Ok(&self.model)
    }
}

fn required(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Config {
        message: format!("{} is required when SESSION_BACKEND=hosted", key),
    })
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
            retry_jitter_ms: 1000,
        }
    }
}
