//! Static reference tables shared by the builder and the search service.
//!
//! Everything here is immutable and process-wide. Bump [`TABLES_VERSION`]
//! whenever a table changes in a way that alters builder output.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::normalize::to_ascii;

pub const TABLES_VERSION: u32 = 1;

/// 47 prefectures in JIS order (`01`..`47`) with their romaji slugs.
pub const PREFECTURES: [(&str, &str); 47] = [
    ("北海道", "hokkaido"),
    ("青森県", "aomori"),
    ("岩手県", "iwate"),
    ("宮城県", "miyagi"),
    ("秋田県", "akita"),
    ("山形県", "yamagata"),
    ("福島県", "fukushima"),
    ("茨城県", "ibaraki"),
    ("栃木県", "tochigi"),
    ("群馬県", "gunma"),
    ("埼玉県", "saitama"),
    ("千葉県", "chiba"),
    ("東京都", "tokyo"),
    ("神奈川県", "kanagawa"),
    ("新潟県", "niigata"),
    ("富山県", "toyama"),
    ("石川県", "ishikawa"),
    ("福井県", "fukui"),
    ("山梨県", "yamanashi"),
    ("長野県", "nagano"),
    ("岐阜県", "gifu"),
    ("静岡県", "shizuoka"),
    ("愛知県", "aichi"),
    ("三重県", "mie"),
    ("滋賀県", "shiga"),
    ("京都府", "kyoto"),
    ("大阪府", "osaka"),
    ("兵庫県", "hyogo"),
    ("奈良県", "nara"),
    ("和歌山県", "wakayama"),
    ("鳥取県", "tottori"),
    ("島根県", "shimane"),
    ("岡山県", "okayama"),
    ("広島県", "hiroshima"),
    ("山口県", "yamaguchi"),
    ("徳島県", "tokushima"),
    ("香川県", "kagawa"),
    ("愛媛県", "ehime"),
    ("高知県", "kochi"),
    ("福岡県", "fukuoka"),
    ("佐賀県", "saga"),
    ("長崎県", "nagasaki"),
    ("熊本県", "kumamoto"),
    ("大分県", "oita"),
    ("宮崎県", "miyazaki"),
    ("鹿児島県", "kagoshima"),
    ("沖縄県", "okinawa"),
];

/// Canonical prefecture names, longest first, for prefix matching.
pub static PREFS_LONGEST_FIRST: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut names: Vec<&'static str> = PREFECTURES.iter().map(|(name, _)| *name).collect();
    names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    names
});

static PREF_BY_SLUG: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| PREFECTURES.iter().map(|(name, slug)| (*slug, *name)).collect());

/// Look up a prefecture by romaji slug (`tokyo` → `東京都`).
pub fn pref_by_slug(slug: &str) -> Option<&'static str> {
    PREF_BY_SLUG.get(slug).copied()
}

/// Look up a prefecture by its 1-based JIS code.
pub fn pref_by_code(code: usize) -> Option<&'static str> {
    code.checked_sub(1)
        .and_then(|i| PREFECTURES.get(i))
        .map(|(name, _)| *name)
}

pub fn is_prefecture(name: &str) -> bool {
    PREFECTURES.iter().any(|(n, _)| *n == name)
}

fn canonical_pref(name: &str) -> Option<&'static str> {
    PREFECTURES.iter().map(|(n, _)| *n).find(|n| *n == name)
}

/// Resolve user or source input to a canonical prefecture name.
///
/// Accepts the full name, a 1-2 digit JIS code, a romaji slug, or the name
/// without its 都/道/府/県 suffix (`東京` → `東京都`).
pub fn resolve_pref(input: &str) -> Option<&'static str> {
    let s = to_ascii(input);
    if s.is_empty() {
        return None;
    }
    if let Some(name) = canonical_pref(&s) {
        return Some(name);
    }
    if s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok().and_then(pref_by_code);
    }
    if let Some(name) = pref_by_slug(&s.to_lowercase()) {
        return Some(name);
    }
    ["都", "道", "府", "県"]
        .iter()
        .find_map(|suffix| canonical_pref(&format!("{}{}", s, suffix)))
}

/// Data domain, the first path segment under the data root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Medical,
    Care,
}

impl Domain {
    pub fn dir(self) -> &'static str {
        match self {
            Domain::Medical => "medical",
            Domain::Care => "care",
        }
    }
}

/// Facility category. The slug doubles as the directory name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Hospital,
    Clinic,
    Dental,
    Pharmacy,
    Tokuyou,
    Rouken,
    HomeHelp,
    DayService,
    CommunityDayService,
    RegularPatrolNursing,
    NightHomeHelp,
    CareMedicalInstitute,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Hospital,
        Category::Clinic,
        Category::Dental,
        Category::Pharmacy,
        Category::Tokuyou,
        Category::Rouken,
        Category::HomeHelp,
        Category::DayService,
        Category::CommunityDayService,
        Category::RegularPatrolNursing,
        Category::NightHomeHelp,
        Category::CareMedicalInstitute,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Hospital => "hospital",
            Category::Clinic => "clinic",
            Category::Dental => "dental",
            Category::Pharmacy => "pharmacy",
            Category::Tokuyou => "tokuyou",
            Category::Rouken => "rouken",
            Category::HomeHelp => "home_help",
            Category::DayService => "day_service",
            Category::CommunityDayService => "community_day_service",
            Category::RegularPatrolNursing => "regular_patrol_nursing",
            Category::NightHomeHelp => "night_home_help",
            Category::CareMedicalInstitute => "care_medical_institute",
        }
    }

    pub fn domain(self) -> Domain {
        match self {
            Category::Hospital | Category::Clinic | Category::Dental | Category::Pharmacy => {
                Domain::Medical
            }
            _ => Domain::Care,
        }
    }

    /// Japanese display label.
    pub fn label(self) -> &'static str {
        match self {
            Category::Hospital => "病院",
            Category::Clinic => "診療所",
            Category::Dental => "歯科",
            Category::Pharmacy => "調剤薬局",
            Category::Tokuyou => "特別養護老人ホーム",
            Category::Rouken => "介護老人保健施設",
            Category::HomeHelp => "訪問介護",
            Category::DayService => "通所介護",
            Category::CommunityDayService => "地域密着型通所介護",
            Category::RegularPatrolNursing => "定期巡回・随時対応型訪問介護看護",
            Category::NightHomeHelp => "夜間対応型訪問介護",
            Category::CareMedicalInstitute => "介護医療院",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.slug() == slug)
    }

    /// Resolve a slug, a Japanese alias or a label to a category.
    pub fn resolve(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        Self::from_slug(&trimmed.to_lowercase())
            .or_else(|| KIND_ALIASES.get(trimmed).copied())
            .or_else(|| Self::ALL.iter().copied().find(|c| c.label() == trimmed))
    }
}

/// Japanese names users type for each category.
static KIND_ALIASES: Lazy<HashMap<&'static str, Category>> = Lazy::new(|| {
    HashMap::from([
        ("病院", Category::Hospital),
        ("クリニック", Category::Clinic),
        ("診療所", Category::Clinic),
        ("歯科", Category::Dental),
        ("歯科医院", Category::Dental),
        ("薬局", Category::Pharmacy),
        ("調剤薬局", Category::Pharmacy),
        ("特養", Category::Tokuyou),
        ("老健", Category::Rouken),
        ("介護医療院", Category::CareMedicalInstitute),
        ("デイサービス", Category::DayService),
        ("地域密着型通所介護", Category::CommunityDayService),
        ("訪問介護", Category::HomeHelp),
        ("夜間対応型訪問介護", Category::NightHomeHelp),
        ("定期巡回・随時対応", Category::RegularPatrolNursing),
    ])
});

/// Words that mean "every category" in the kind filter.
pub const ALL_KINDS_WORDS: [&str; 3] = ["全て", "すべて", "all"];

/// Day-of-week symbols in display order. 祝 is public holidays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "月", alias = "mon")]
    Mon,
    #[serde(rename = "火", alias = "tue")]
    Tue,
    #[serde(rename = "水", alias = "wed")]
    Wed,
    #[serde(rename = "木", alias = "thu")]
    Thu,
    #[serde(rename = "金", alias = "fri")]
    Fri,
    #[serde(rename = "土", alias = "sat")]
    Sat,
    #[serde(rename = "日", alias = "sun")]
    Sun,
    #[serde(rename = "祝", alias = "hol")]
    Hol,
}

impl Day {
    pub const ALL: [Day; 8] = [
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
        Day::Sun,
        Day::Hol,
    ];

    pub const WEEKDAYS: [Day; 5] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri];

    pub fn symbol(self) -> &'static str {
        match self {
            Day::Mon => "月",
            Day::Tue => "火",
            Day::Wed => "水",
            Day::Thu => "木",
            Day::Fri => "金",
            Day::Sat => "土",
            Day::Sun => "日",
            Day::Hol => "祝",
        }
    }

    pub fn english(self) -> &'static str {
        match self {
            Day::Mon => "mon",
            Day::Tue => "tue",
            Day::Wed => "wed",
            Day::Thu => "thu",
            Day::Fri => "fri",
            Day::Sat => "sat",
            Day::Sun => "sun",
            Day::Hol => "hol",
        }
    }
}

/// Department spellings collapsed onto one canonical name.
pub const DEPT_ALIASES: [(&str, &str); 7] = [
    ("耳鼻科", "耳鼻咽喉科"),
    ("耳鼻いんこう科", "耳鼻咽喉科"),
    ("心療内科", "精神科・心療内科"),
    ("精神科", "精神科・心療内科"),
    ("産科", "産婦人科"),
    ("婦人科", "産婦人科"),
    ("リハビリ科", "リハビリテーション科"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pref_code_lookup() {
        assert_eq!(pref_by_code(1), Some("北海道"));
        assert_eq!(pref_by_code(13), Some("東京都"));
        assert_eq!(pref_by_code(47), Some("沖縄県"));
        assert_eq!(pref_by_code(0), None);
        assert_eq!(pref_by_code(48), None);
    }

    #[test]
    fn test_resolve_pref() {
        assert_eq!(resolve_pref("東京都"), Some("東京都"));
        assert_eq!(resolve_pref("東京"), Some("東京都"));
        assert_eq!(resolve_pref("北海"), Some("北海道"));
        assert_eq!(resolve_pref("13"), Some("東京都"));
        assert_eq!(resolve_pref("０１"), Some("北海道"));
        assert_eq!(resolve_pref("Osaka"), Some("大阪府"));
        assert_eq!(resolve_pref("XYZ"), None);
        assert_eq!(resolve_pref("99"), None);
        assert_eq!(resolve_pref(""), None);
    }

    #[test]
    fn test_longest_first_order() {
        let first = PREFS_LONGEST_FIRST[0];
        assert_eq!(first.chars().count(), 4);
        assert_eq!(PREFS_LONGEST_FIRST.len(), 47);
    }

    #[test]
    fn test_category_resolve() {
        assert_eq!(Category::resolve("hospital"), Some(Category::Hospital));
        assert_eq!(Category::resolve("特養"), Some(Category::Tokuyou));
        assert_eq!(Category::resolve("介護老人保健施設"), Some(Category::Rouken));
        assert_eq!(Category::resolve("veterinary"), None);
        assert_eq!(Category::Tokuyou.domain(), Domain::Care);
        assert_eq!(Category::Pharmacy.domain(), Domain::Medical);
    }

    #[test]
    fn test_day_serializes_as_symbol() {
        assert_eq!(serde_json::to_string(&Day::Sat).unwrap(), "\"土\"");
        let day: Day = serde_json::from_str("\"hol\"").unwrap();
        assert_eq!(day, Day::Hol);
    }
}
