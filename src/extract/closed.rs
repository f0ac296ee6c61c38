//! Closed days (休診日).

use super::row::{is_truthy, Row};
use crate::tables::Day;

const CLOSED_TEXT_KEYS: [&str; 7] = ["closed", "休診日", "定休日", "休業日", "休館日", "休診", "休み"];

fn closed_marker_keys(day: Day) -> Vec<String> {
    let (sym, eng) = (day.symbol(), day.english());
    let mut keys = vec![
        format!("{}曜休診", sym),
        format!("休診日_{}", sym),
        format!("{}_休診", sym),
        format!("closed_{}", eng),
        format!("{}_closed", eng),
    ];
    if day == Day::Hol {
        keys.push("祝日休診".to_string());
    }
    keys
}

fn open_marker_keys(day: Day) -> Vec<String> {
    let (sym, eng) = (day.symbol(), day.english());
    vec![
        format!("{}曜診療", sym),
        format!("診療日_{}", sym),
        format!("{}_診療", sym),
        format!("open_{}", eng),
        format!("{}_open", eng),
    ]
}

/// Whether the row marks `day` as closed, either directly or through an
/// open-day column that is present but not set.
fn is_closed(row: &Row, day: Day) -> bool {
    let closed = closed_marker_keys(day)
        .iter()
        .any(|k| row.get(k).map_or(false, |v| is_truthy(&v)));
    let not_open = open_marker_keys(day)
        .iter()
        .any(|k| row.contains(k) && !row.get(k).map_or(false, |v| is_truthy(&v)));
    closed || not_open
}

/// `水・日・祝`-style list from marker columns, else the free-text field.
pub fn read_closed(row: &Row) -> String {
    let days: Vec<&str> = Day::ALL
        .iter()
        .filter(|d| is_closed(row, **d))
        .map(|d| d.symbol())
        .collect();
    if !days.is_empty() {
        return days.join("・");
    }
    row.pick_str(&CLOSED_TEXT_KEYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(v: Value) -> Row {
        Row::new(v.as_object().cloned().unwrap())
    }

    #[test]
    fn test_closed_markers() {
        let r = row(json!({"水曜休診": "○", "closed_sun": "1", "休診日_祝": "true", "月曜休診": "0"}));
        assert_eq!(read_closed(&r), "水・日・祝");
    }

    #[test]
    fn test_open_markers() {
        let r = row(json!({
            "open_mon": "1", "open_tue": "1", "open_wed": "", "open_thu": "1",
            "open_fri": "1", "open_sat": "0", "open_sun": "0",
        }));
        assert_eq!(read_closed(&r), "水・土・日");
    }

    #[test]
    fn test_free_text_fallback() {
        let r = row(json!({"休診日": "日曜・祝日、木曜午後"}));
        assert_eq!(read_closed(&r), "日曜・祝日、木曜午後");
        assert_eq!(read_closed(&row(json!({}))), "");
        assert_eq!(read_closed(&row(json!({"休み": "土日祝"}))), "土日祝");
    }
}
