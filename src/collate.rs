//! Japanese sort keys.
//!
//! Shift_JIS byte order follows JIS X 0208, which places ASCII before kana
//! before kanji and orders level-1 kanji by their usual reading. Katakana is
//! folded to hiragana first so `クリニック` and `くりにっく` sort together.

use std::cmp::Ordering;

use encoding_rs::SHIFT_JIS;
use unicode_normalization::UnicodeNormalization;

/// Byte key for ascending Japanese order.
pub fn sort_key(s: &str) -> Vec<u8> {
    let folded: String = s
        .nfkc()
        .map(|c| match c {
            // ゔ, ゕ and ゖ are outside JIS X 0208, so ヴ, ヵ and ヶ stay.
            'ァ'..='ン' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
            _ => c,
        })
        .collect();
    let (bytes, _, _) = SHIFT_JIS.encode(&folded);
    bytes.into_owned()
}

pub fn compare(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_before_kana_before_kanji() {
        let mut names = vec!["病院", "あおば", "ABC"];
        names.sort_by(|a, b| compare(a, b));
        assert_eq!(names, vec!["ABC", "あおば", "病院"]);
    }

    #[test]
    fn test_katakana_folds_to_hiragana() {
        assert_eq!(compare("クリニック", "くりにっく"), Ordering::Equal);
        assert_eq!(compare("あ", "イ"), Ordering::Less);
    }

    #[test]
    fn test_katakana_outside_fold_range_encodes() {
        assert_eq!(compare("ABC病院", "ヴィラ"), Ordering::Less);
        assert!(!sort_key("ヴィラ").contains(&b'&'));
        assert!(!sort_key("緑ヶ丘クリニック").contains(&b'&'));
        assert!(!sort_key("ヵ月").contains(&b'&'));
    }

    #[test]
    fn test_kanji_reading_order() {
        // 愛 (あい) sorts before 札 (さつ) in JIS level 1.
        assert_eq!(compare("愛知", "札幌"), Ordering::Less);
    }
}
