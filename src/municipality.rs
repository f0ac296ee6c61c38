//! Prefecture → municipality lookup and address-based city inference.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::collate;
use crate::error::EtlResult;
use crate::tables::{is_prefecture, PREFS_LONGEST_FIRST};

/// One entry of `pref/<pref>.json`: a bare name, or a name with its reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CityEntry {
    Name(String),
    WithYomi {
        name: String,
        #[serde(default)]
        yomi: String,
    },
}

impl CityEntry {
    pub fn name(&self) -> &str {
        match self {
            CityEntry::Name(name) => name,
            CityEntry::WithYomi { name, .. } => name,
        }
    }
}

/// Fallback patterns when a prefecture has no municipality list, in order.
static CITY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let body = r"[^0-9０-９\s\-－、。()（）]";
    [
        format!(r"^({b}{{1,6}}?郡{b}{{1,6}}?[市町村])", b = body),
        format!(r"^({b}{{1,6}}?市)", b = body),
        format!(r"^({b}{{1,6}}?区)", b = body),
        format!(r"^({b}{{1,6}}?町)", b = body),
        format!(r"^({b}{{1,6}}?村)", b = body),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

#[derive(Debug, Clone, Default)]
struct PrefCities {
    /// Longest name first, for substring matching.
    longest_first: Vec<String>,
    /// Japanese collation order, for listing.
    sorted: Vec<String>,
}

impl PrefCities {
    fn new(names: Vec<String>) -> Self {
        let mut longest_first = names.clone();
        longest_first.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        longest_first.dedup();

        let mut sorted = names;
        sorted.sort_by(|a, b| collate::compare(a, b).then_with(|| a.cmp(b)));
        sorted.dedup();

        Self {
            longest_first,
            sorted,
        }
    }
}

/// Municipality names per prefecture. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MunicipalityIndex {
    by_pref: HashMap<String, PrefCities>,
}

impl MunicipalityIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_lists<I, P, C>(lists: I) -> Self
    where
        I: IntoIterator<Item = (P, Vec<C>)>,
        P: Into<String>,
        C: Into<String>,
    {
        let by_pref = lists
            .into_iter()
            .map(|(pref, names)| {
                let names: Vec<String> = names.into_iter().map(Into::into).collect();
                (pref.into(), PrefCities::new(names))
            })
            .collect();
        Self { by_pref }
    }

    /// Load every `<root>/pref/<prefecture>.json`. A missing directory gives
    /// an empty index; an unreadable file is skipped with a warning.
    pub fn load(data_root: &Path) -> EtlResult<Self> {
        let dir = data_root.join("pref");
        if !dir.is_dir() {
            debug!("No municipality directory at {:?}", dir);
            return Ok(Self::empty());
        }

        let mut by_pref = HashMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            let Some(pref) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_prefecture(pref) {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(crate::error::EtlError::from)
                .and_then(|s| Ok(serde_json::from_str::<Vec<CityEntry>>(&s)?));
            match parsed {
                Ok(entries) => {
                    let names = entries.iter().map(|e| e.name().to_string()).collect();
                    by_pref.insert(pref.to_string(), PrefCities::new(names));
                }
                Err(e) => warn!("Skipping municipality list {:?}: {}", path, e),
            }
        }
        debug!("Loaded municipality lists for {} prefectures", by_pref.len());
        Ok(Self { by_pref })
    }

    /// Municipalities of `pref` in Japanese collation order.
    pub fn cities(&self, pref: &str) -> &[String] {
        self.by_pref
            .get(pref)
            .map(|c| c.sorted.as_slice())
            .unwrap_or(&[])
    }

    /// Prefecture and city from a free-text address.
    pub fn infer(&self, address: &str) -> (Option<&'static str>, String) {
        let (pref, rest) = split_pref(address);
        match pref {
            Some(p) => (Some(p), self.infer_city(p, rest)),
            None => (None, String::new()),
        }
    }

    /// City of `pref` mentioned in `text`. The longest known name wins; with
    /// no list for `pref`, the leading `…市/区/町/村` of the text is used.
    pub fn infer_city(&self, pref: &str, text: &str) -> String {
        let text = text.trim();
        let text = text.strip_prefix(pref).unwrap_or(text).trim_start();
        match self.by_pref.get(pref) {
            Some(cities) if !cities.longest_first.is_empty() => cities
                .longest_first
                .iter()
                .find(|c| text.contains(c.as_str()))
                .cloned()
                .unwrap_or_default(),
            _ => CITY_PATTERNS
                .iter()
                .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Split a leading prefecture name off an address.
pub fn split_pref(address: &str) -> (Option<&'static str>, &str) {
    let trimmed = address.trim_start();
    PREFS_LONGEST_FIRST
        .iter()
        .find_map(|p| trimmed.strip_prefix(*p).map(|rest| (Some(*p), rest)))
        .unwrap_or((None, trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_first() {
        let index = MunicipalityIndex::from_lists([("東京都", vec!["市", "八王子市"])]);
        let (pref, city) = index.infer("東京都八王子市元本郷町3-24-1");
        assert_eq!(pref, Some("東京都"));
        assert_eq!(city, "八王子市");
    }

    #[test]
    fn test_ward_before_city() {
        let index = MunicipalityIndex::from_lists([(
            "北海道",
            vec!["札幌市", "札幌市中央区", "函館市"],
        )]);
        assert_eq!(index.infer("北海道札幌市中央区北1条西2丁目").1, "札幌市中央区");
        assert_eq!(index.infer("北海道函館市五稜郭町1").1, "函館市");
    }

    #[test]
    fn test_regex_fallback() {
        let index = MunicipalityIndex::empty();
        assert_eq!(index.infer("東京都西多摩郡瑞穂町箱根ケ崎2335").1, "西多摩郡瑞穂町");
        assert_eq!(index.infer("大阪府吹田市江坂町1-2").1, "吹田市");
        assert_eq!(index.infer("東京都新宿区西新宿2-8-1").1, "新宿区");
        assert_eq!(index.infer("123 Unknown St").0, None);
    }

    #[test]
    fn test_unknown_city_is_empty() {
        let index = MunicipalityIndex::from_lists([("東京都", vec!["新宿区"])]);
        assert_eq!(index.infer("東京都渋谷区道玄坂1-1").1, "");
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let pref_dir = dir.path().join("pref");
        std::fs::create_dir_all(&pref_dir).unwrap();
        std::fs::write(pref_dir.join("東京都.json"), r#"["新宿区", "あきる野市", "渋谷区"]"#).unwrap();
        std::fs::write(
            pref_dir.join("大阪府.json"),
            r#"[{"name": "大阪市北区", "yomi": "おおさかしきたく"}, {"name": "堺市"}]"#,
        )
        .unwrap();
        std::fs::write(pref_dir.join("broken.json"), "not json").unwrap();
        std::fs::write(pref_dir.join("京都府.json"), "not json").unwrap();

        let index = MunicipalityIndex::load(dir.path()).unwrap();
        assert_eq!(index.cities("東京都"), ["あきる野市", "渋谷区", "新宿区"]);
        assert_eq!(index.infer("大阪府大阪市北区梅田1").1, "大阪市北区");
        assert!(index.cities("京都府").is_empty());
        assert!(index.cities("沖縄県").is_empty());
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = MunicipalityIndex::load(dir.path()).unwrap();
        assert!(index.cities("東京都").is_empty());
    }
}
