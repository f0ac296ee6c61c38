use std::path::PathBuf;

use anyhow::Context;

use super::{category_path, parse_records, FacilitySource, RawRecord};
use crate::tables::Category;

/// Reads category files from a local data root.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait::async_trait]
impl FacilitySource for FsSource {
    fn name(&self) -> &str {
        "fs"
    }

    async fn load(&self, category: Category, pref: &str) -> anyhow::Result<Vec<RawRecord>> {
        let path = self.root.join(category_path(category, pref));
        let body = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        parse_records(&body).with_context(|| format!("Failed to parse {:?}", path))
    }
}
