//! Service configuration.
//!
//! Resolved as built-in defaults, then an optional JSON file named by
//! `DIRECTORY_CONFIG`, then individual environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const CONFIG_FILE_ENV: &str = "DIRECTORY_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding `medical/`, `care/` and `pref/`.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// When set, category files are fetched over HTTP from this base URL
    /// instead of being read from `data_root`.
    #[serde(default)]
    pub data_base_url: Option<String>,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("public/data")
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_page_size() -> usize {
    50
}

fn default_max_page_size() -> usize {
    200
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            data_base_url: None,
            bind_addr: default_bind_addr(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` for environment access.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_ENV) {
            Some(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(root) = get("DATA_ROOT") {
            self.data_root = PathBuf::from(root);
        }
        if let Some(base) = get("DATA_BASE_URL") {
            self.data_base_url = Some(base.trim_end_matches('/').to_string());
        }
        if let Some(addr) = get("BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(size) = get("DEFAULT_PAGE_SIZE") {
            self.default_page_size = size
                .parse()
                .with_context(|| format!("DEFAULT_PAGE_SIZE is not a number: {}", size))?;
        }
        if let Some(size) = get("MAX_PAGE_SIZE") {
            self.max_page_size = size
                .parse()
                .with_context(|| format!("MAX_PAGE_SIZE is not a number: {}", size))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            anyhow::bail!("max_page_size must be at least 1");
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size must be between 1 and {} (got {})",
                self.max_page_size,
                self.default_page_size
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_with(env(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data_root, PathBuf::from("public/data"));
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.max_page_size, 200);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.json");
        std::fs::write(&path, r#"{"data_root": "/srv/data", "bind_addr": "127.0.0.1:8080"}"#).unwrap();

        let config = AppConfig::load_with(env(&[
            (CONFIG_FILE_ENV, path.to_str().unwrap()),
            ("BIND_ADDR", "127.0.0.1:9090"),
            ("DATA_BASE_URL", "https://cdn.example.jp/data/"),
        ]))
        .unwrap();

        assert_eq!(config.data_root, PathBuf::from("/srv/data"));
        assert_eq!(config.bind_addr, "127.0.0.1:9090");
        assert_eq!(config.data_base_url.as_deref(), Some("https://cdn.example.jp/data"));
        assert_eq!(config.default_page_size, 50);
    }

    #[test]
    fn test_invalid_page_sizes() {
        assert!(AppConfig::load_with(env(&[("DEFAULT_PAGE_SIZE", "abc")])).is_err());
        assert!(AppConfig::load_with(env(&[("DEFAULT_PAGE_SIZE", "500")])).is_err());
        assert!(AppConfig::load_with(env(&[("MAX_PAGE_SIZE", "0")])).is_err());
    }
}
