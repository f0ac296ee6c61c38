//! Facility search: load, decorate, filter, sort, paginate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::collate::sort_key;
use crate::config::AppConfig;
use crate::decorate::decorate;
use crate::extract::night::{EMERGENCY_RE, MEMO_KEYS, NIGHT_RE};
use crate::municipality::MunicipalityIndex;
use crate::normalize::{normalize_city, to_ascii};
use crate::source::{FacilitySource, RawRecord};
use crate::tables::{resolve_pref, Category, ALL_KINDS_WORDS};

const CITY_CODE_KEYS: [&str; 3] = ["city_code", "cityCode", "市区町村コード"];
const CITY_TEXT_KEYS: [&str; 3] = ["city", "municipality", "address"];
const KEYWORD_KEYS: [&str; 5] = ["name", "kana", "address", "hours", "closed"];

/// Query string of `/search`. Everything is optional text so that a
/// malformed number never rejects the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub pref: Option<String>,
    #[serde(alias = "category")]
    pub kind: Option<String>,
    pub city: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResponse {
    pub total: usize,
    pub items: Vec<RawRecord>,
}

pub struct QueryService {
    source: Arc<dyn FacilitySource>,
    index: Arc<MunicipalityIndex>,
    default_size: usize,
    max_size: usize,
}

impl QueryService {
    pub fn new(
        source: Arc<dyn FacilitySource>,
        index: Arc<MunicipalityIndex>,
        config: &AppConfig,
    ) -> Self {
        Self {
            source,
            index,
            default_size: config.default_page_size,
            max_size: config.max_page_size,
        }
    }

    pub async fn search(&self, params: &SearchParams) -> SearchResponse {
        let Some(pref) = params.pref.as_deref().and_then(resolve_pref) else {
            debug!("Unresolvable prefecture {:?}", params.pref);
            return SearchResponse::default();
        };

        // Categories are fetched one after another; a failed one adds nothing.
        let mut rows = Vec::new();
        for category in target_categories(params.kind.as_deref()) {
            match self.source.load(category, pref).await {
                Ok(records) => rows.extend(
                    records
                        .into_iter()
                        .map(|r| self.prepare(r, category, pref)),
                ),
                Err(e) => debug!("Skipping {} in {}: {:#}", category.slug(), pref, e),
            }
        }

        let city = params.city.as_deref().map(str::trim).unwrap_or("");
        let q = params.q.as_deref().map(str::trim).unwrap_or("");
        rows.retain(|r| matches_city(r, city) && matches_keyword(r, q));
        rows.sort_by_cached_key(|r| (sort_key(text(r, "name")), text(r, "id").to_string()));

        let total = rows.len();
        let (page, size) = self.page_window(params);
        let start = (page - 1).saturating_mul(size);
        let items: Vec<RawRecord> = rows.into_iter().skip(start).take(size).collect();
        info!(
            "search {} kind={:?} city={:?} q={:?}: {} hits, page {} ({} items)",
            pref,
            params.kind,
            city,
            q,
            total,
            page,
            items.len()
        );
        SearchResponse { total, items }
    }

    /// Municipalities of a prefecture in display order.
    pub fn cities(&self, pref: &str) -> Vec<String> {
        resolve_pref(pref)
            .map(|p| self.index.cities(p).to_vec())
            .unwrap_or_default()
    }

    /// Page (from 1) and page size. Unparsable values use the defaults.
    pub fn page_window(&self, params: &SearchParams) -> (usize, usize) {
        let parse = |v: &Option<String>| v.as_deref().and_then(|s| to_ascii(s).trim().parse::<usize>().ok());
        let page = parse(&params.page).filter(|p| *p >= 1).unwrap_or(1);
        let size = parse(&params.size)
            .map(|s| s.clamp(1, self.max_size))
            .unwrap_or(self.default_size);
        (page, size)
    }

    fn prepare(&self, record: RawRecord, category: Category, pref: &str) -> RawRecord {
        let mut out = decorate(record, category);
        if text(&out, "pref").is_empty() {
            out.insert("pref".into(), Value::String(pref.to_string()));
        }
        if text(&out, "city").is_empty() {
            let city = self.index.infer_city(pref, text(&out, "address"));
            if !city.is_empty() {
                out.insert("city".into(), Value::String(city));
            }
        }
        out
    }
}

/// Categories named by the `kind` parameter. Blank or an "all" word means
/// every category; an unknown name means none.
pub fn target_categories(kind: Option<&str>) -> Vec<Category> {
    let kind = kind.map(str::trim).unwrap_or("");
    if kind.is_empty() || ALL_KINDS_WORDS.iter().any(|w| w.eq_ignore_ascii_case(kind)) {
        return Category::ALL.to_vec();
    }
    Category::resolve(kind).into_iter().collect()
}

fn text<'a>(record: &'a RawRecord, key: &str) -> &'a str {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
}

/// A digit code matches the start of a city-code field. Any other input
/// matches a city/municipality/address substring, or the city loosely equal.
pub fn matches_city(record: &RawRecord, city: &str) -> bool {
    if city.is_empty() {
        return true;
    }
    let input = to_ascii(city);
    if input.chars().all(|c| c.is_ascii_digit()) {
        return CITY_CODE_KEYS.iter().any(|k| {
            let code = match record.get(*k) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return false,
            };
            code.starts_with(&input)
        });
    }

    let needle = input.to_lowercase();
    let loose = normalize_city(&input);
    if !loose.is_empty() && normalize_city(text(record, "city")) == loose {
        return true;
    }
    CITY_TEXT_KEYS
        .iter()
        .any(|k| to_ascii(text(record, k)).to_lowercase().contains(&needle))
}

/// Night or emergency vocabulary selects on the derived label; anything else
/// is a case-insensitive substring search.
pub fn matches_keyword(record: &RawRecord, q: &str) -> bool {
    if q.is_empty() {
        return true;
    }
    let q = to_ascii(q);
    let label = text(record, "nightLabel");
    if EMERGENCY_RE.is_match(&q) {
        return label.starts_with("救急");
    }
    if NIGHT_RE.is_match(&q) {
        return !label.is_empty();
    }

    let needle = q.to_lowercase();
    let departments = match record.get("departments") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    };
    let mut haystack: Vec<&str> = KEYWORD_KEYS.iter().map(|k| text(record, k)).collect();
    haystack.extend(MEMO_KEYS.iter().map(|k| text(record, k)));
    haystack.push(&departments);
    to_ascii(&haystack.join(" ")).to_lowercase().contains(&needle)
}
