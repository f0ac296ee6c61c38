//! Clock times and time ranges as written in source data.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::to_ascii;

pub const DAY_MINUTES: u32 = 24 * 60;

static RE_CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?::|時)(\d{1,2})?(?::\d{2})?分?$").unwrap());

static RE_COMPACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{3,4})$").unwrap());

/// `HH:MM〜HH:MM`-shaped substring, after [`to_ascii`].
pub static RE_TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(翌)?(\d{1,2})(?::|時)(\d{2})?分?\s*[~\-–—〜]\s*(翌)?(\d{1,2})(?::|時)(\d{2})?分?",
    )
    .unwrap()
});

/// A single clock mention, e.g. `20:00`, `翌8:00`, `22時`.
pub static RE_CLOCK_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(翌)?(\d{1,2})(?::|時)(\d{2})?").unwrap());

/// Parse a clock value into minutes after midnight. `翌` adds a day.
pub fn parse_clock(raw: &str) -> Option<u32> {
    let s = to_ascii(raw);
    let (next_day, s) = match s.strip_prefix('翌') {
        Some(rest) => (true, rest.trim()),
        None => (false, s.as_str()),
    };

    let (h, m) = if let Some(c) = RE_CLOCK.captures(s) {
        let h: u32 = c.get(1)?.as_str().parse().ok()?;
        let m: u32 = c.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        (h, m)
    } else if let Some(c) = RE_COMPACT.captures(s) {
        let n: u32 = c.get(1)?.as_str().parse().ok()?;
        (n / 100, n % 100)
    } else {
        return None;
    };

    clock_minutes(h, m, next_day)
}

fn clock_minutes(h: u32, m: u32, next_day: bool) -> Option<u32> {
    if h > 48 || m >= 60 {
        return None;
    }
    let base = h * 60 + m;
    Some(if next_day { base + DAY_MINUTES } else { base })
}

/// `HH:MM`, wrapping anything past midnight.
pub fn fmt_clock(minutes: u32) -> String {
    let m = minutes % DAY_MINUTES;
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Start/end in minutes. An end at or past [`DAY_MINUTES`] is on the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: u32,
    pub end: u32,
    /// Byte offset of the match in the text it came from.
    pub offset: usize,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        let end = if end <= start && end < DAY_MINUTES && start < DAY_MINUTES {
            end + DAY_MINUTES
        } else {
            end
        };
        Self { start, end, offset: 0 }
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end >= DAY_MINUTES
    }

    /// `HH:MM〜HH:MM`, with `翌` before an end on the next day.
    pub fn display(&self) -> String {
        let next = if self.crosses_midnight() { "翌" } else { "" };
        format!("{}〜{}{}", fmt_clock(self.start), next, fmt_clock(self.end))
    }
}

/// Every time range in `text`, in order of appearance.
pub fn find_spans(text: &str) -> Vec<Span> {
    let ascii = to_ascii(text);
    RE_TIME_RANGE
        .captures_iter(&ascii)
        .filter_map(|c| {
            let start = clock_minutes(
                c.get(2)?.as_str().parse().ok()?,
                c.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?,
                c.get(1).is_some(),
            )?;
            let end = clock_minutes(
                c.get(5)?.as_str().parse().ok()?,
                c.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?,
                c.get(4).is_some(),
            )?;
            let mut span = Span::new(start, end);
            span.offset = c.get(0)?.start();
            Some(span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_forms() {
        assert_eq!(parse_clock("09:00"), Some(540));
        assert_eq!(parse_clock("9:30"), Some(570));
        assert_eq!(parse_clock("０９：００"), Some(540));
        assert_eq!(parse_clock("0830"), Some(510));
        assert_eq!(parse_clock("17時"), Some(1020));
        assert_eq!(parse_clock("翌8:00"), Some(1920));
        assert_eq!(parse_clock("18:00:00"), Some(1080));
        assert_eq!(parse_clock("午前"), None);
        assert_eq!(parse_clock("9:75"), None);
    }

    #[test]
    fn test_span_display() {
        assert_eq!(Span::new(540, 1080).display(), "09:00〜18:00");
        assert_eq!(Span::new(1200, 540).display(), "20:00〜翌09:00");
        assert_eq!(Span::new(1200, 540 + DAY_MINUTES).display(), "20:00〜翌09:00");
    }

    #[test]
    fn test_find_spans() {
        let spans = find_spans("平日 ９：００〜１２：００、夜間：20:00～翌8:00");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].display(), "09:00〜12:00");
        assert_eq!(spans[1].display(), "20:00〜翌08:00");
        assert!(spans[0].offset < spans[1].offset);
    }
}
