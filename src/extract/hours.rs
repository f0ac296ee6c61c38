//! Opening hours display string.
//!
//! Source data carries hours in at least six different shapes. Each shape has
//! its own strategy; [`read_hours`] tries them in the order of
//! [`HOURS_STRATEGIES`] and keeps the first non-empty result.

use std::collections::BTreeMap;

use serde_json::Value;

use super::row::Row;
use super::time::{find_spans, parse_clock, Span};
use crate::record::{HoursByDept, TimeRange};
use crate::tables::Day;

pub type HoursStrategy = fn(&Row) -> Option<String>;

/// Strategy order. Reordering changes output for records that carry more
/// than one shape.
pub const HOURS_STRATEGIES: [(&str, HoursStrategy); 6] = [
    ("pharmacy_slots", pharmacy_slots),
    ("dept_hours", dept_hours),
    ("flat_alias", flat_alias),
    ("weekday_triple", weekday_triple),
    ("paired_columns", paired_columns),
    ("text_scan", text_scan),
];

/// Key the structured per-department map is kept under once `hours` has been
/// replaced by its display string.
pub const HOURS_DETAIL_KEY: &str = "hoursByDept";

const PHARMACY_SLOTS: u32 = 4;

const FLAT_HOURS_KEYS: [&str; 11] = [
    "hours",
    "診療時間",
    "営業時間",
    "開店時間",
    "受付時間",
    "opening_hours",
    "business_hours",
    "利用可能時間",
    "サービス提供時間",
    "営業時間帯",
    "診療受付時間",
];

const WEEKDAY_KEYS: [&str; 4] = ["平日", "平日診療時間", "weekday", "hours_weekday"];
const SATURDAY_KEYS: [&str; 5] = ["土曜", "土曜日", "土曜診療時間", "saturday", "hours_saturday"];
const SUNDAY_KEYS: [&str; 6] = ["日曜", "日曜日", "日祝", "日曜・祝日", "sunday", "hours_sunday"];

const PAIRED_KEYS: [(&str, &str); 7] = [
    ("開始時間", "終了時間"),
    ("営業開始時間", "営業終了時間"),
    ("診療開始時間", "診療終了時間"),
    ("受付開始時間", "受付終了時間"),
    ("start_time", "end_time"),
    ("opening_time", "closing_time"),
    ("open", "close"),
];

/// Display hours for a record, or an empty string.
pub fn read_hours(row: &Row) -> String {
    HOURS_STRATEGIES
        .iter()
        .find_map(|(_, strategy)| strategy(row).filter(|s| !s.is_empty()))
        .unwrap_or_default()
}

/// `<day>_開店時間帯<n>_開始時間` / `_終了時間`, up to four slots a day.
pub fn pharmacy_slots(row: &Row) -> Option<String> {
    let mut week: BTreeMap<Day, Vec<String>> = BTreeMap::new();
    for day in Day::ALL {
        for n in 1..=PHARMACY_SLOTS {
            let start = row.get(&format!("{}_開店時間帯{}_開始時間", day.symbol(), n));
            let end = row.get(&format!("{}_開店時間帯{}_終了時間", day.symbol(), n));
            if let (Some(s), Some(e)) = (start, end) {
                week.entry(day).or_default().push(slot_label(&s, &e));
            }
        }
    }
    non_empty(compact_week(&week))
}

/// Structured per-department hours, either as a nested map or as
/// `<day>_診療開始時間` / `<day>_外来受付開始時間` columns.
pub fn dept_hours(row: &Row) -> Option<String> {
    let nested = [row.value("hours"), row.value(HOURS_DETAIL_KEY)]
        .into_iter()
        .flatten()
        .find_map(|v| match v {
            Value::Object(_) => serde_json::from_value::<HoursByDept>(v.clone()).ok(),
            _ => None,
        });
    if let Some(hours) = nested {
        if let Some(display) = non_empty(pivot_display(&hours)) {
            return Some(display);
        }
    }

    let consult = day_columns(row, "診療開始時間", "診療終了時間");
    let week = if consult.is_empty() {
        day_columns(row, "外来受付開始時間", "外来受付終了時間")
    } else {
        consult
    };
    non_empty(compact_week(&week))
}

fn day_columns(row: &Row, start_suffix: &str, end_suffix: &str) -> BTreeMap<Day, Vec<String>> {
    let mut week = BTreeMap::new();
    for day in Day::ALL {
        let start = row.get(&format!("{}_{}", day.symbol(), start_suffix));
        let end = row.get(&format!("{}_{}", day.symbol(), end_suffix));
        if let (Some(s), Some(e)) = (start, end) {
            week.insert(day, vec![slot_label(&s, &e)]);
        }
    }
    week
}

/// Display string for a per-department map. Consultation hours are used
/// when any department has them, reception hours otherwise. With several
/// departments each day collapses to its earliest start and latest end.
pub fn pivot_display(hours: &HoursByDept) -> String {
    let use_consult = hours.values().any(|h| !h.consult.is_empty());
    let bags: Vec<&BTreeMap<Day, Vec<TimeRange>>> = hours
        .values()
        .map(|h| if use_consult { &h.consult } else { &h.accept })
        .filter(|bag| !bag.is_empty())
        .collect();

    let mut week: BTreeMap<Day, Vec<String>> = BTreeMap::new();
    for day in Day::ALL {
        let ranges: Vec<&TimeRange> = bags.iter().filter_map(|b| b.get(&day)).flatten().collect();
        if ranges.is_empty() {
            continue;
        }
        let labels = if bags.len() > 1 {
            collapse(&ranges).map(|s| vec![s.display()]).unwrap_or_default()
        } else {
            ranges.iter().map(|(s, e)| slot_label(s, e)).collect()
        };
        if !labels.is_empty() {
            week.insert(day, labels);
        }
    }
    compact_week(&week)
}

fn collapse(ranges: &[&TimeRange]) -> Option<Span> {
    let spans: Vec<Span> = ranges
        .iter()
        .filter_map(|(s, e)| Some(Span::new(parse_clock(s)?, parse_clock(e)?)))
        .collect();
    let start = spans.iter().map(|s| s.start).min()?;
    let end = spans.iter().map(|s| s.end).max()?;
    Some(Span::new(start, end))
}

/// Single-field hours columns.
pub fn flat_alias(row: &Row) -> Option<String> {
    row.pick(&FLAT_HOURS_KEYS)
}

/// Separate weekday / Saturday / Sunday columns.
pub fn weekday_triple(row: &Row) -> Option<String> {
    let parts: Vec<String> = [("平日", &WEEKDAY_KEYS[..]), ("土", &SATURDAY_KEYS[..]), ("日", &SUNDAY_KEYS[..])]
        .iter()
        .filter_map(|(label, keys)| row.pick(keys).map(|v| format!("{}:{}", label, v)))
        .collect();
    non_empty(parts.join("/"))
}

/// The first known start/end column pair with both sides set.
pub fn paired_columns(row: &Row) -> Option<String> {
    PAIRED_KEYS.iter().find_map(|(start, end)| {
        let s = row.get(start)?;
        let e = row.get(end)?;
        Some(slot_label(&s, &e))
    })
}

/// Last resort: the first `HH:MM〜HH:MM` anywhere in the record.
pub fn text_scan(row: &Row) -> Option<String> {
    row.scalars()
        .find_map(|(_, v)| find_spans(&v).into_iter().next())
        .map(|span| span.display())
}

/// `HH:MM〜HH:MM` when both sides parse, the trimmed source text otherwise.
pub fn slot_label(start: &str, end: &str) -> String {
    match (parse_clock(start), parse_clock(end)) {
        (Some(s), Some(e)) => Span::new(s, e).display(),
        _ => format!("{}〜{}", start.trim(), end.trim()),
    }
}

/// `平日:…/土:…/日:…/祝:…` when Monday to Friday share the same slots,
/// one entry per weekday otherwise.
pub fn compact_week(week: &BTreeMap<Day, Vec<String>>) -> String {
    let mut parts = Vec::new();

    let weekdays: Vec<Option<&Vec<String>>> = Day::WEEKDAYS.iter().map(|d| week.get(d)).collect();
    let shared = match weekdays[0] {
        Some(first) => weekdays.iter().all(|d| *d == Some(first)),
        None => false,
    };
    if shared {
        if let Some(first) = weekdays[0] {
            parts.push(format!("平日:{}", first.join(",")));
        }
    } else {
        for day in Day::WEEKDAYS {
            if let Some(slots) = week.get(&day) {
                parts.push(format!("{}:{}", day.symbol(), slots.join(",")));
            }
        }
    }
    for day in [Day::Sat, Day::Sun, Day::Hol] {
        if let Some(slots) = week.get(&day) {
            parts.push(format!("{}:{}", day.symbol(), slots.join(",")));
        }
    }
    parts.join("/")
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
