//! Japanese phone number extraction.
//!
//! Output is either empty or a `0`-prefixed number with 10 or 11 digits,
//! hyphenated. Partial or malformed fragments are never returned.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::row::Row;
use crate::normalize::to_ascii_phone;

/// Explicit phone columns, checked before any scan.
pub const TEL_KEYS: [&str; 11] = [
    "tel",
    "phone",
    "tel_no",
    "TEL",
    "Tel",
    "電話",
    "電話番号",
    "外来受付電話番号",
    "代表電話番号",
    "連絡先電話番号",
    "案内用電話番号",
];

/// Columns never scanned for a phone number.
const NON_PHONE_KEYS: [&str; 12] = [
    "id",
    "ID",
    "医療機関コード",
    "施設ID",
    "機関ID",
    "事業所番号",
    "lat",
    "lng",
    "緯度",
    "経度",
    "所在地座標（緯度）",
    "所在地座標（経度）",
];

static RE_FAX_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)fax|ＦＡＸ|ファックス|ファクス|ﾌｧｯｸｽ").unwrap());

static RE_PHONE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)電話|tel|phone").unwrap());

static RE_COUNTRY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\+\s*81|^81[\s-])[\s-]*(?:0[\s-]*)?").unwrap());

/// A `0`-led digit run whose groups are separated by spaces.
static RE_SPACED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^0-9-])(0[0-9-]*(?:\s+[0-9][0-9-]*)+)").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A digit/dash run starting with `0`. Length is checked separately so an
/// over-long run is rejected rather than truncated.
static RE_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9-])(0[0-9-]*)").unwrap());

static RE_DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

pub fn is_fax_header(header: &str) -> bool {
    RE_FAX_HEADER.is_match(header)
}

/// Canonical phone number from one free-text value, or an empty string.
pub fn extract_tel(raw: &str) -> String {
    let ascii = to_ascii_phone(raw);
    let national = RE_COUNTRY_CODE.replace_all(&ascii, "0");
    if let Some(tel) = first_candidate(&national) {
        return tel;
    }

    // Spaces inside a `0`-led run act like dashes. Digits before the run
    // (house numbers and the like) stay separate.
    let joined = RE_SPACED_RUN.replace_all(&national, |c: &Captures| {
        format!("{}{}", &c[1], RE_WHITESPACE.replace_all(&c[2], "-"))
    });
    first_candidate(&joined).unwrap_or_default()
}

fn first_candidate(text: &str) -> Option<String> {
    RE_CANDIDATE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find_map(|m| format_candidate(m.as_str()))
}

fn format_candidate(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim_matches('-');
    if !(7..=13).contains(&trimmed.len()) {
        return None;
    }
    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(digits.starts_with('0') && (digits.len() == 10 || digits.len() == 11)) {
        return None;
    }
    if trimmed.contains('-') {
        return Some(RE_DASH_RUN.replace_all(trimmed, "-").into_owned());
    }
    Some(format_digits(&digits))
}

/// Hyphenate a bare 10/11-digit number: `3-4-4` for 11 digits, `2-4-4` for
/// 10-digit `03`/`06` numbers, `3-3-4` for other 10-digit numbers.
pub fn format_digits(d: &str) -> String {
    match d.len() {
        11 => format!("{}-{}-{}", &d[..3], &d[3..7], &d[7..]),
        10 if d.starts_with("03") || d.starts_with("06") => {
            format!("{}-{}-{}", &d[..2], &d[2..6], &d[6..])
        }
        10 => format!("{}-{}-{}", &d[..3], &d[3..6], &d[6..]),
        _ => String::new(),
    }
}

/// Phone number for a record: explicit phone columns first, then any
/// phone-labeled column, then every other non-FAX column.
pub fn read_tel(row: &Row) -> String {
    let explicit = TEL_KEYS
        .iter()
        .filter_map(|k| row.get(k))
        .map(|v| extract_tel(&v))
        .find(|t| !t.is_empty());
    if let Some(tel) = explicit {
        return tel;
    }

    let labeled = row
        .scalars()
        .filter(|(k, _)| RE_PHONE_HEADER.is_match(k) && !is_fax_header(k))
        .map(|(_, v)| extract_tel(&v))
        .find(|t| !t.is_empty());
    if let Some(tel) = labeled {
        return tel;
    }

    row.scalars()
        .filter(|(k, _)| !is_fax_header(k) && !NON_PHONE_KEYS.contains(k))
        .map(|(_, v)| extract_tel(&v))
        .find(|t| !t.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: serde_json::Value) -> Row {
        Row::new(v.as_object().cloned().unwrap())
    }

    fn digit_len(s: &str) -> usize {
        s.chars().filter(|c| c.is_ascii_digit()).count()
    }

    #[test]
    fn test_fullwidth_number() {
        assert_eq!(extract_tel("０６-１２３４-５６７８"), "06-1234-5678");
    }

    #[test]
    fn test_country_code() {
        assert_eq!(extract_tel("+81-3-1234-5678"), "03-1234-5678");
        assert_eq!(extract_tel("+81 (0)3 1234 5678"), "03-1234-5678");
        assert_eq!(extract_tel("81-90-1234-5678"), "090-1234-5678");
    }

    #[test]
    fn test_synthesized_segmentation() {
        assert_eq!(extract_tel("0312345678"), "03-1234-5678");
        assert_eq!(extract_tel("0451234567"), "045-123-4567");
        assert_eq!(extract_tel("09012345678"), "090-1234-5678");
    }

    #[test]
    fn test_preserves_source_segmentation() {
        assert_eq!(extract_tel("0276-12-3456"), "0276-12-3456");
        assert_eq!(extract_tel("(0276)12-3456"), "0276-12-3456");
        assert_eq!(extract_tel("TEL：0120－123－456"), "0120-123-456");
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert_eq!(extract_tel("03-1234-567"), "");
        assert_eq!(extract_tel("1311132000"), "");
        assert_eq!(extract_tel("03-1234-5678-9999"), "");
        assert_eq!(extract_tel("なし"), "");
        assert_eq!(extract_tel(""), "");
    }

    #[test]
    fn test_output_digit_length_always_10_or_11() {
        let inputs = [
            "03-1234-5678",
            "０３ー１２３４ー５６７８",
            "+81-6-1234-5678",
            "012-345",
            "0-0-0-0-0-0-0",
            "0000000000000000",
            "電話 03 1234 5678 内線 12",
            "090-1234-56789",
            "tel:0312345678 fax:0312345679",
            "〒100-0001 東京都千代田区",
            "07012345678901",
        ];
        for input in inputs {
            let out = extract_tel(input);
            if !out.is_empty() {
                let n = digit_len(&out);
                assert!(n == 10 || n == 11, "{:?} -> {:?}", input, out);
                assert!(out.starts_with('0'), "{:?} -> {:?}", input, out);
            }
        }
    }

    #[test]
    fn test_read_tel_skips_fax_columns() {
        let r = row(json!({
            "FAX番号": "03-9999-0000",
            "備考": "予約は 03-1111-2222 まで",
        }));
        assert_eq!(read_tel(&r), "03-1111-2222");

        let fax_only = row(json!({"FAX": "03-9999-0000"}));
        assert_eq!(read_tel(&fax_only), "");
    }

    #[test]
    fn test_read_tel_prefers_explicit_column() {
        let r = row(json!({
            "電話番号": "0422-11-2233",
            "連絡先": "090-0000-1111",
        }));
        assert_eq!(read_tel(&r), "0422-11-2233");
    }

    #[test]
    fn test_address_before_number() {
        assert_eq!(extract_tel("西新宿2-8-1 03-5321-1111"), "03-5321-1111");
        assert_eq!(extract_tel("西新宿2-8-1 03 5321 1111"), "03-5321-1111");
        let r = row(json!({"連絡先": "新宿区西新宿2-8-1 03-5321-1111"}));
        assert_eq!(read_tel(&r), "03-5321-1111");
    }

    #[test]
    fn test_read_tel_ignores_id_columns() {
        let r = row(json!({"ID": "0131234567", "名称": "あおば薬局"}));
        assert_eq!(read_tel(&r), "");
    }

    #[test]
    fn test_canonical_value_is_stable() {
        let once = extract_tel("０３（１２３４）５６７８");
        assert_eq!(once, "03-1234-5678");
        assert_eq!(extract_tel(&once), once);
    }
}
