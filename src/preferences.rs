use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::constants::*;
use crate::error::PreferencesError;

/// How timestamps are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateStyle {
    #[default]
    Absolute,
    Relative,
}

impl DateStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            DateStyle::Absolute => "absolute",
            DateStyle::Relative => "relative",
        }
    }
}

impl fmt::Display for DateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(DateStyle::Absolute),
            "relative" => Ok(DateStyle::Relative),
            other => Err(format!("unknown date style: {}", other)),
        }
    }
}

/// Process-wide key-value preference store.
///
/// Cheap to clone; every clone shares the same map. Readers see a write on
/// their next read, so a token change applies from the next request on.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    values: Arc<RwLock<HashMap<String, String>>>,
    path: Option<PathBuf>,
}

impl Preferences {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a JSON-backed store. A missing or malformed file starts empty.
    ///
    /// A file that exists but cannot be read is left alone: the store falls
    /// back to memory only.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "ignoring malformed preferences file"
                );
                HashMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "preferences file unreadable, changes will not be saved"
                );
                return Self::in_memory();
            }
        };

        Self {
            values: Arc::new(RwLock::new(values)),
            path: Some(path),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    /// Stores a value. With a backing file, nothing changes unless the write succeeds.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), PreferencesError> {
        let mut values = self.values.write().await;
        let mut updated = values.clone();
        updated.insert(key.to_string(), value.to_string());

        if let Some(path) = &self.path {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(dir).await?;
            }
            let json = serde_json::to_string_pretty(&updated)?;
            tokio::fs::write(path, format!("{json}\n")).await?;
        }

        *values = updated;
        Ok(())
    }

    /// The bearer token, empty when none has been stored.
    pub async fn api_token(&self) -> String {
        self.get(PREF_API_TOKEN).await.unwrap_or_default()
    }

    pub async fn set_api_token(&self, token: &str) -> Result<(), PreferencesError> {
        self.set(PREF_API_TOKEN, token.trim()).await
    }

    pub async fn date_style(&self) -> DateStyle {
        self.get(PREF_DATE_STYLE)
            .await
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub async fn set_date_style(&self, style: DateStyle) -> Result<(), PreferencesError> {
        self.set(PREF_DATE_STYLE, style.as_str()).await
    }
}
