use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "smartpol.json";
pub const API_URL_ENV: &str = "SMARTPOL_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Io(String, #[source] std::io::Error),
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub session_path: String,
    pub page_size: u32,
    pub report_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: option_env!("SMARTPOL_API_URL")
                .unwrap_or("http://localhost:3000")
                .to_string(),
            session_path: "session.db".to_string(),
            page_size: 10,
            report_limit: crate::backend::api::reports::DEFAULT_REPORT_LIMIT,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// `smartpol.json` when present, then the `SMARTPOL_API_URL` override.
    /// Falls back to defaults on any error.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            match Self::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring {}: {}", CONFIG_FILE, e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(url) = std::env::var(API_URL_ENV) {
                if !url.trim().is_empty() {
                    config.api_url = url;
                }
            }
        }
        if config.page_size == 0 {
            config.page_size = Self::default().page_size;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"api_url": "https://api.smartpol.co", "page_size": 25}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_url, "https://api.smartpol.co");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.session_path, "session.db");
        assert_eq!(config.report_limit, 50);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(Config::from_file(&path), Err(ConfigError::Parse(_))));
    }
}
