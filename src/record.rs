//! Persisted facility records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalize::to_ascii;
use crate::tables::{Category, Day};

/// `[start, end]` as written in the source, e.g. `["09:00", "12:30"]`.
pub type TimeRange = (String, String);

/// Per-day time ranges for one department.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeptHours {
    /// Consultation hours (診療時間).
    #[serde(default)]
    pub consult: BTreeMap<Day, Vec<TimeRange>>,
    /// Reception hours (外来受付時間).
    #[serde(default)]
    pub accept: BTreeMap<Day, Vec<TimeRange>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HoursKind {
    Consult,
    Accept,
}

/// Department name → hours.
pub type HoursByDept = BTreeMap<String, DeptHours>;

/// One facility as written to `<domain>/<category>/<pref>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kana: String,
    #[serde(default)]
    pub address: String,
    pub pref: String,
    #[serde(default)]
    pub city: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub tel: String,
    #[serde(default)]
    pub url: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<HoursByDept>,

    // Long-term-care only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub open_days: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_days_note: Option<String>,
}

impl FacilityRecord {
    pub fn new(id: String, name: String, category: Category) -> Self {
        Self {
            id,
            name,
            kana: String::new(),
            address: String::new(),
            pref: String::new(),
            city: String::new(),
            lat: None,
            lng: None,
            tel: String::new(),
            url: String::new(),
            category,
            departments: Vec::new(),
            hours: None,
            kind_label: None,
            service_type: None,
            capacity: None,
            open_days: Vec::new(),
            open_days_note: None,
        }
    }

    /// Add one time range, creating the department entry on first use.
    pub fn put_slot(&mut self, dept: &str, kind: HoursKind, day: Day, range: TimeRange) {
        let entry = self
            .hours
            .get_or_insert_with(BTreeMap::new)
            .entry(dept.to_string())
            .or_default();
        let bag = match kind {
            HoursKind::Consult => &mut entry.consult,
            HoursKind::Accept => &mut entry.accept,
        };
        bag.entry(day).or_default().push(range);
    }
}

/// Coordinate from a CSV cell. Blank, unparsable and zero are all absent.
pub fn parse_coord(raw: &str) -> Option<f64> {
    let v: f64 = to_ascii(raw).parse().ok()?;
    if v == 0.0 || !v.is_finite() {
        None
    } else {
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coord() {
        assert_eq!(parse_coord("35.6895"), Some(35.6895));
        assert_eq!(parse_coord("0.0"), None);
        assert_eq!(parse_coord(""), None);
        assert_eq!(parse_coord("不明"), None);
    }

    #[test]
    fn test_serialized_shape() {
        let mut rec = FacilityRecord::new("001".into(), "青葉病院".into(), Category::Hospital);
        rec.pref = "東京都".into();
        rec.put_slot(
            "内科",
            HoursKind::Consult,
            Day::Mon,
            ("09:00".into(), "12:00".into()),
        );
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["category"], "hospital");
        assert_eq!(v["lat"], serde_json::Value::Null);
        assert_eq!(v["hours"]["内科"]["consult"]["月"][0][1], "12:00");
        assert!(v.get("kindLabel").is_none());
        assert!(v.get("departments").is_none());
    }

    #[test]
    fn test_reads_english_day_keys() {
        let raw = r#"{"薬局": {"consult": {"mon": [["09:00", "18:00"]]}}}"#;
        let hours: HoursByDept = serde_json::from_str(raw).unwrap();
        assert_eq!(hours["薬局"].consult[&Day::Mon].len(), 1);
        assert!(hours["薬局"].accept.is_empty());
    }
}
