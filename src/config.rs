use crate::constants::*;
use crate::preferences::DateStyle;
use reqwest::Url;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub data_path: String,
    pub api_token: Option<String>,
    pub date_style: Option<DateStyle>,
    pub timeout: Duration,
    pub page_size: u32,
    pub tags_page_size: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Invalid date style: {0} (expected absolute or relative)")]
    InvalidDateStyle(String),
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_path: DEFAULT_DATA_PATH.to_string(),
            api_token: None,
            date_style: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
            tags_page_size: TAGS_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url =
            lookup("PROVENANCE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let data_path =
            lookup("PROVENANCE_DATA_PATH").unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());

        // Validate the base URL is absolute http(s)
        validate_base_url(&base_url)?;

        let api_token = lookup("PROVENANCE_API_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let date_style = match lookup("PROVENANCE_DATE_STYLE") {
            Some(raw) => Some(
                raw.parse::<DateStyle>()
                    .map_err(|_| ConfigError::InvalidDateStyle(raw))?,
            ),
            None => None,
        };

        let timeout = match lookup("PROVENANCE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            data_path,
            api_token,
            date_style,
            timeout,
            ..Config::default()
        })
    }

    /// Config pointing at another API root, e.g. a local mock.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        validate_base_url(base_url)?;
        Ok(Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..Config::default()
        })
    }

    pub fn preferences_path(&self) -> PathBuf {
        PathBuf::from(&self.data_path).join(PREFERENCES_FILE_NAME)
    }
}

fn validate_base_url(raw: &str) -> Result<(), ConfigError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidBaseUrl(raw.to_string())),
    }
}
