use anyhow::Context;
use reqwest::Client;
use tracing::debug;

use super::{category_path, parse_records, FacilitySource, RawRecord};
use crate::tables::Category;

/// Fetches category files from a static host mirroring the data root.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, category: Category, pref: &str) -> String {
        let rel = category_path(category, pref);
        format!("{}/{}", self.base_url, rel.to_string_lossy().replace('\\', "/"))
    }
}

#[async_trait::async_trait]
impl FacilitySource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn load(&self, category: Category, pref: &str) -> anyhow::Result<Vec<RawRecord>> {
        let url = self.url_for(category, pref);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("{} returned {}", url, status);
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;
        parse_records(&body).with_context(|| format!("Failed to parse {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let source = HttpSource::new("https://cdn.example.jp/data/".into());
        assert_eq!(
            source.url_for(Category::Tokuyou, "沖縄県"),
            "https://cdn.example.jp/data/care/tokuyou/沖縄県.json"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        let source = HttpSource::new("http://127.0.0.1:9".into());
        assert!(source.load(Category::Hospital, "東京都").await.is_err());
    }
}
