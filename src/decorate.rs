//! Query-time display fields.
//!
//! [`decorate`] turns a stored record into what the search endpoint returns.
//! Applying it to its own output changes nothing: every derived field is
//! written under a key its extractor reads back first.

use serde_json::{Map, Value};

use crate::extract::hours::HOURS_DETAIL_KEY;
use crate::extract::{night_label, night_source_text, read_closed, read_depts, read_hours, read_tel, read_url, Row};
use crate::tables::Category;

pub fn decorate(record: Map<String, Value>, category: Category) -> Map<String, Value> {
    let mut row = Row::new(record);

    let hours = read_hours(&row);
    let night = night_label(&night_source_text(&row, &hours));
    let tel = read_tel(&row);
    let url = read_url(&row);
    let closed = read_closed(&row);
    let departments = read_depts(&row);

    // The structured pivot moves aside so `hours` can hold the display string.
    if let Some(detail @ Value::Object(_)) = row.value("hours").cloned() {
        if !row.contains(HOURS_DETAIL_KEY) {
            row.insert(HOURS_DETAIL_KEY, detail);
        }
    }
    row.insert("hours", Value::String(hours));
    row.insert("tel", Value::String(tel));
    row.insert("url", Value::String(url));
    row.insert("closed", Value::String(closed));
    row.insert("nightLabel", Value::String(night));
    if !departments.is_empty() {
        row.insert(
            "departments",
            Value::Array(departments.into_iter().map(Value::String).collect()),
        );
    }
    row.insert("kind", Value::String(category.slug().to_string()));
    if row.get("kindLabel").is_none() {
        row.insert("kindLabel", Value::String(category.label().to_string()));
    }
    row.into_map()
}
