//! Process configuration, read once from the environment at startup.

use std::fmt;
use std::str::FromStr;

use axum::http::HeaderValue;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Mode::Development),
            "production" | "prod" => Ok(Mode::Production),
            _ => Err(ConfigError::InvalidMode(value.to_owned())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("development"),
            Mode::Production => f.write_str("production"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_ENV must be `development` or `production`, got {0:?}")]
    InvalidMode(String),
    #[error("API_KEY must be set in production")]
    MissingApiKey,
    #[error("{name} is not a valid number: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("ALLOWED_ORIGINS entry {0:?} is not a valid origin")]
    InvalidOrigin(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// Secret expected in the `x-api-key` header. Only checked in production.
    pub api_key: Option<String>,
    /// Origins allowed to call the API from a browser in production.
    pub allowed_origins: Vec<String>,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: Mode::Development,
            api_key: None,
            allowed_origins: Vec::new(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Production configuration guarded by `api_key`.
    pub fn production(api_key: impl Into<String>) -> Self {
        Config {
            mode: Mode::Production,
            api_key: Some(api_key.into()),
            ..Config::default()
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup("APP_ENV") {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => Mode::default(),
        };

        let api_key = lookup("API_KEY").filter(|key| !key.is_empty());
        if mode == Mode::Production && api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        let allowed_origins = parse_origins(lookup("ALLOWED_ORIGINS").as_deref().unwrap_or(""))?;
        let port = parse_number("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let max_upload_bytes =
            parse_number("MAX_UPLOAD_BYTES", lookup("MAX_UPLOAD_BYTES"), DEFAULT_MAX_UPLOAD_BYTES)?;

        Ok(Config {
            mode,
            api_key,
            allowed_origins,
            port,
            max_upload_bytes,
        })
    }

    pub fn requires_api_key(&self) -> bool {
        self.mode == Mode::Production
    }
}

fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| match HeaderValue::from_str(origin) {
            Ok(_) => Ok(origin.to_owned()),
            Err(_) => Err(ConfigError::InvalidOrigin(origin.to_owned())),
        })
        .collect()
}

fn parse_number<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        _ => Ok(default),
    }
}
