//! Department (診療科) names.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use super::row::Row;
use crate::tables::DEPT_ALIASES;

static RE_DEPT_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[、，,/／・\s]+").unwrap());

/// Columns that hold a department list as one string.
const DEPT_KEYS: [&str; 4] = ["診療科", "診療科目", "診療科目名", "departments"];

/// Canonical department name: NFKC, no whitespace, aliases collapsed.
pub fn canon_dept(name: &str) -> String {
    let compact: String = name.nfkc().filter(|c| !c.is_whitespace()).collect();
    DEPT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == compact)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(compact)
}

/// Canonicalize and de-duplicate, keeping first-seen order.
pub fn dedupe_depts<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let canon = canon_dept(name.as_ref());
        if !canon.is_empty() && !out.contains(&canon) {
            out.push(canon);
        }
    }
    out
}

/// Split a free-text department list.
///
/// `・` is a separator here, so a canonical name like `精神科・心療内科`
/// splits into two parts that both collapse back onto it.
pub fn split_depts(text: &str) -> Vec<String> {
    dedupe_depts(RE_DEPT_SEPARATOR.split(text).filter(|s| !s.is_empty()))
}

/// Departments for a record, from an array field or a delimited string.
pub fn read_depts(row: &Row) -> Vec<String> {
    if let Some(Value::Array(items)) = row.value("departments") {
        let parts: Vec<String> = items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(split_depts)
            .collect();
        return dedupe_depts(parts);
    }
    row.pick(&DEPT_KEYS)
        .map(|text| split_depts(&text))
        .unwrap_or_default()
}
