//! Where the query service reads per-prefecture category files from.
//!
//! The built files can be served from the local data root or from any static
//! host mirroring its layout. Both implement [`FacilitySource`].

pub mod fs;
pub mod http;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::tables::Category;

pub use fs::FsSource;
pub use http::HttpSource;

/// One stored record, as loosely shaped JSON.
pub type RawRecord = Map<String, Value>;

/// Async trait implemented by each storage backend.
#[async_trait::async_trait]
pub trait FacilitySource: Send + Sync {
    fn name(&self) -> &str;
    /// Every record of `category` in `pref`. A missing file is an error.
    async fn load(&self, category: Category, pref: &str) -> anyhow::Result<Vec<RawRecord>>;
}

/// `<domain>/<category>/<pref>.json`, relative to the data root.
pub fn category_path(category: Category, pref: &str) -> PathBuf {
    PathBuf::from(category.domain().dir())
        .join(category.slug())
        .join(format!("{}.json", pref))
}

/// HTTP when a base URL is configured, the local data root otherwise.
pub fn from_config(config: &AppConfig) -> Arc<dyn FacilitySource> {
    match &config.data_base_url {
        Some(base) => Arc::new(HttpSource::new(base.clone())),
        None => Arc::new(FsSource::new(config.data_root.clone())),
    }
}

/// Parse a category file body: a JSON array of objects. Non-object entries
/// are dropped.
pub(crate) fn parse_records(body: &str) -> anyhow::Result<Vec<RawRecord>> {
    let items: Vec<Value> = serde_json::from_str(body)?;
    Ok(items
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(m) => Some(m),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_path() {
        assert_eq!(
            category_path(Category::Hospital, "東京都"),
            PathBuf::from("medical/hospital/東京都.json")
        );
        assert_eq!(
            category_path(Category::DayService, "北海道"),
            PathBuf::from("care/day_service/北海道.json")
        );
    }

    #[test]
    fn test_parse_records() {
        let records = parse_records(r#"[{"id": "1"}, 3, {"id": "2"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert!(parse_records(r#"{"id": "1"}"#).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig {
            data_base_url: Some("https://cdn.example.jp/data".into()),
            ..Default::default()
        };
        assert_eq!(from_config(&config).name(), "http");
        assert_eq!(from_config(&AppConfig::default()).name(), "fs");
    }
}
