//! Website URL lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::row::Row;
use crate::normalize::{normalize_url, BARE_DOMAIN_PATTERN};

/// Known URL columns, in priority order.
pub const URL_KEYS: [&str; 10] = [
    "url",
    "URL",
    "Url",
    "website",
    "homepage",
    "HP",
    "ホームページ",
    "ホームページアドレス",
    "案内用ホームページアドレス",
    "薬局のホームページアドレス",
];

const MAX_SCAN_DEPTH: usize = 3;

static RE_SCHEME_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^\s"'<>）)」、。]+"#).unwrap());

static RE_BARE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i){}", *BARE_DOMAIN_PATTERN)).unwrap());

/// Absolute URL for a record, or an empty string.
pub fn read_url(row: &Row) -> String {
    let explicit = URL_KEYS
        .iter()
        .filter_map(|k| row.get(k))
        .map(|v| normalize_url(&v))
        .find(|u| !u.is_empty());
    if let Some(url) = explicit {
        return url;
    }

    let mut texts = Vec::new();
    for value in row.as_map().values() {
        collect_strings(value, 0, &mut texts);
    }

    let with_scheme = texts.iter().find_map(|t| {
        RE_SCHEME_URL
            .find_iter(t)
            .map(|m| normalize_url(m.as_str()))
            .find(|u| !u.is_empty())
    });
    if let Some(url) = with_scheme {
        return url;
    }

    texts
        .iter()
        .find_map(|t| {
            RE_BARE_URL
                .find_iter(t)
                // `info@example.jp` is a mail address, not a site.
                .filter(|m| !t[..m.start()].ends_with('@'))
                .filter(|m| !t[..m.start()].ends_with(|c: char| c.is_ascii_alphanumeric()))
                .map(|m| normalize_url(m.as_str()))
                .find(|u| !u.is_empty())
        })
        .unwrap_or_default()
}

fn collect_strings<'a>(value: &'a Value, depth: usize, out: &mut Vec<&'a str>) {
    if depth > MAX_SCAN_DEPTH {
        return;
    }
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => {
            for item in items {
                collect_strings(item, depth + 1, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                collect_strings(item, depth + 1, out);
            }
        }
        _ => {}
    }
}
