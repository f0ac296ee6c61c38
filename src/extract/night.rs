//! Night / emergency service label.
//!
//! Two vocabularies are matched over the hours display plus memo fields.
//! Emergency wins over night when both match.

use once_cell::sync::Lazy;
use regex::Regex;

use super::row::Row;
use super::time::{find_spans, fmt_clock, Span, DAY_MINUTES, RE_CLOCK_MENTION};
use crate::normalize::to_ascii;

pub static EMERGENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"救急|救命|(?:^|[^A-Za-z])ER(?:[^A-Za-z]|$)").unwrap());

pub static NIGHT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"夜間|深夜|時間外|当直|24時間").unwrap());

/// Words a time range may follow directly.
/// `ER` only counts as a standalone word, as in [`EMERGENCY_RE`].
static RE_RANGE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^A-Za-z])(ER)(?:[^A-Za-z]|$)|(救急|救命|夜間|深夜|時間外|当直)").unwrap()
});

/// How far after a label (in characters) a range still belongs to it.
const LABEL_WINDOW: usize = 12;

const NIGHT_FROM: u32 = 20 * 60;

/// Free-text fields that may mention night or emergency service.
pub const MEMO_KEYS: [&str; 10] = [
    "備考",
    "memo",
    "note",
    "notes",
    "特記事項",
    "診療時間備考",
    "救急備考",
    "時間外対応",
    "openDaysNote",
    "利用可能曜日特記事項",
];

pub const EMERGENCY_LABEL: &str = "救急対応";
pub const NIGHT_LABEL: &str = "対応あり";

/// Hours display plus memo fields, the text the label is derived from.
pub fn night_source_text(row: &Row, hours: &str) -> String {
    let mut parts = vec![hours.to_string()];
    parts.extend(MEMO_KEYS.iter().filter_map(|k| row.get(k)));
    parts.join(" ")
}

pub fn night_label(text: &str) -> String {
    let text = to_ascii(text);
    if EMERGENCY_RE.is_match(&text) {
        return match emergency_span(&text) {
            Some(span) => format!("救急：{}", span.display()),
            None => EMERGENCY_LABEL.to_string(),
        };
    }
    if NIGHT_RE.is_match(&text) {
        return match latest_night_clock(&text) {
            Some(m) => format!("〜{}", fmt_clock(m)),
            None => NIGHT_LABEL.to_string(),
        };
    }
    String::new()
}

/// The range right after an emergency/night label, else the last range.
fn emergency_span(text: &str) -> Option<Span> {
    let spans = find_spans(text);
    let labelled = RE_RANGE_LABEL.captures_iter(text).find_map(|c| {
        let end = c.get(1).or_else(|| c.get(2))?.end();
        spans.iter().copied().find(|span| {
            span.offset >= end && text[end..span.offset].chars().count() <= LABEL_WINDOW
        })
    });
    labelled.or_else(|| spans.last().copied())
}

/// Latest clock mention at or after 20:00, in minutes (翌 adds a day).
fn latest_night_clock(text: &str) -> Option<u32> {
    RE_CLOCK_MENTION
        .captures_iter(text)
        .filter_map(|c| {
            let whole = c.get(0)?;
            // `24時間` is a duration, not a clock.
            if c.get(3).is_none() && text[whole.end()..].starts_with('間') {
                return None;
            }
            let h: u32 = c.get(2)?.as_str().parse().ok()?;
            let m: u32 = c.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
            if h > 48 || m >= 60 {
                return None;
            }
            let base = h * 60 + m;
            Some(if c.get(1).is_some() { base + DAY_MINUTES } else { base })
        })
        .filter(|m| *m >= NIGHT_FROM)
        .max()
}
