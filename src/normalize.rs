//! Text normalizers applied before any pattern matching.
//!
//! Source CSVs mix full-width and ASCII digits, several dash and wave-dash
//! code points, and fully spelled-out URLs next to bare domains. Everything
//! downstream assumes the canonical forms produced here.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::tables::PREFS_LONGEST_FIRST;

/// TLDs accepted when a URL is written without a scheme.
pub const URL_TLDS: [&str; 17] = [
    "co.jp", "or.jp", "ne.jp", "go.jp", "ac.jp", "lg.jp", "jp", "com", "net", "org", "info",
    "biz", "clinic", "hospital", "pharmacy", "co", "io",
];

const DASH_LIKE: [char; 11] = ['‐', '‑', '‒', '–', '—', '―', 'ー', '－', '−', '─', '━'];

static RE_URL_TRAILING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\s\)）」』】〕>\]。、,.;:!?'"]+$"#).unwrap());

static RE_URL_LEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[\s\(（「『【〔<\['"]+"#).unwrap());

static RE_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://\S+$").unwrap());

/// Domain body shared by the anchored check here and the free-text scan in
/// the URL extractor.
pub static BARE_DOMAIN_PATTERN: Lazy<String> = Lazy::new(|| {
    let tlds: Vec<String> = URL_TLDS.iter().map(|t| regex::escape(t)).collect();
    format!(
        r"(?:www\.)?[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)*\.(?:{})(?::\d+)?(?:[/?#][^\s]*)?",
        tlds.join("|")
    )
});

static RE_BARE_DOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)^{}$", *BARE_DOMAIN_PATTERN)).unwrap());

/// Convert full-width digits and punctuation to ASCII.
///
/// NFKC handles digits, `：`, `－` and `～`. The wave dash `〜` maps to `~`,
/// and a long vowel mark `ー` only becomes `-` when it sits between two
/// digits, so katakana words survive.
pub fn to_ascii(s: &str) -> String {
    let folded: Vec<char> = s
        .nfkc()
        .map(|c| match c {
            '〜' | '～' => '~',
            '：' => ':',
            '－' | '−' => '-',
            _ => c,
        })
        .collect();

    let mut out = String::with_capacity(folded.len());
    for (i, &c) in folded.iter().enumerate() {
        if c == 'ー' {
            let prev_digit = i > 0 && folded[i - 1].is_ascii_digit();
            let next_digit = folded.get(i + 1).map_or(false, |n| n.is_ascii_digit());
            if prev_digit && next_digit {
                out.push('-');
                continue;
            }
        }
        out.push(c);
    }
    out.trim().to_string()
}

/// [`to_ascii`] plus phone-specific cleanup: every dash-like character
/// becomes `-` and parentheses become spaces so they act as separators.
pub fn to_ascii_phone(s: &str) -> String {
    to_ascii(s)
        .chars()
        .map(|c| {
            if DASH_LIKE.contains(&c) {
                '-'
            } else if matches!(c, '(' | ')' | '（' | '）') {
                ' '
            } else {
                c
            }
        })
        .collect()
}

pub fn digits_only(s: &str) -> String {
    to_ascii(s).chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a URL-ish value to an absolute URL, or return an empty string.
///
/// Values that already carry an `http(s)://` scheme keep it. Bare domains on
/// an allowed TLD get `https://`. Anything else is rejected.
pub fn normalize_url(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    let trimmed = RE_URL_LEADING.replace(folded.trim(), "");
    let trimmed = RE_URL_TRAILING.replace(&trimmed, "");
    let s = trimmed.trim();
    if s.is_empty() {
        return String::new();
    }

    if RE_SCHEME.is_match(s) {
        return s.to_string();
    }
    if let Some(rest) = s.strip_prefix("//") {
        if RE_BARE_DOMAIN.is_match(rest) {
            return format!("https://{}", rest);
        }
    }
    if RE_BARE_DOMAIN.is_match(s) {
        return format!("https://{}", s);
    }
    String::new()
}

/// Loose municipality form for equality checks: no spaces, no leading
/// prefecture, no trailing 市/区/町/村/郡.
pub fn normalize_city(s: &str) -> String {
    let compact: String = s
        .nfkc()
        .filter(|c| !c.is_whitespace() && *c != '\u{3000}')
        .collect();
    let without_pref = PREFS_LONGEST_FIRST
        .iter()
        .find_map(|p| compact.strip_prefix(*p))
        .unwrap_or(compact.as_str());
    let stripped = without_pref
        .strip_suffix(&['市', '区', '町', '村', '郡'][..])
        .unwrap_or(without_pref);
    stripped.to_string()
}
