//! Field access over loosely shaped source rows.
//!
//! CSV rows and stored JSON records are both viewed as a string-keyed map.
//! A logical field is resolved from an ordered list of candidate keys; the
//! first non-empty value wins.

use serde_json::{Map, Value};

/// A raw record: CSV row or stored JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Map<String, Value>,
}

impl Row {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build from parallel header/value slices, as read from a CSV table.
    pub fn from_pairs(headers: &[String], values: &[String]) -> Self {
        let mut fields = Map::new();
        for (h, v) in headers.iter().zip(values.iter()) {
            fields.insert(h.trim().to_string(), Value::String(v.trim().to_string()));
        }
        Self { fields }
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    /// Scalar value as a trimmed, non-empty string.
    pub fn get(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(scalar_to_string)
    }

    /// First non-empty scalar among `keys`, in order.
    pub fn pick(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.get(k))
    }

    /// Same as [`Row::pick`], empty string when nothing matched.
    pub fn pick_str(&self, keys: &[&str]) -> String {
        self.pick(keys).unwrap_or_default()
    }

    /// Every top-level scalar field, in key order.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, String)> {
        self.fields
            .iter()
            .filter_map(|(k, v)| scalar_to_string(v).map(|s| (k.as_str(), s)))
    }
}

impl From<Map<String, Value>> for Row {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn scalar_to_string(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Truthy marker values used by boolean-like CSV columns.
pub fn is_truthy(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "○" | "◯" | "〇" | "yes" | "有" | "あり"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        match v {
            Value::Object(m) => Row::new(m),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_pick_first_non_empty() {
        let r = row(json!({"name": "  ", "名称": "青葉病院", "facility_name": "other"}));
        assert_eq!(r.pick(&["name", "名称", "facility_name"]).as_deref(), Some("青葉病院"));
        assert_eq!(r.pick(&["missing"]), None);
    }

    #[test]
    fn test_numbers_read_as_strings() {
        let r = row(json!({"lat": 35.5, "flag": true, "nested": {"a": 1}}));
        assert_eq!(r.get("lat").as_deref(), Some("35.5"));
        assert_eq!(r.get("flag").as_deref(), Some("true"));
        assert_eq!(r.get("nested"), None);
    }

    #[test]
    fn test_from_pairs_trims() {
        let headers = vec![" ID ".to_string(), "名称".to_string()];
        let values = vec!["001".to_string(), " 薬局 ".to_string()];
        let r = Row::from_pairs(&headers, &values);
        assert_eq!(r.get("ID").as_deref(), Some("001"));
        assert_eq!(r.get("名称").as_deref(), Some("薬局"));
    }

    #[test]
    fn test_truthy_markers() {
        assert!(is_truthy("1"));
        assert!(is_truthy("○"));
        assert!(is_truthy("TRUE"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
