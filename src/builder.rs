//! Record builder: source CSV tables → per-prefecture JSON partitions.
//!
//! Output lives at `<data-root>/<domain>/<category>/<pref>.json`, one pretty
//! printed array per prefecture, sorted by (city, name, id) in Japanese
//! collation order. Re-running against the same input rewrites identical
//! bytes.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collate::sort_key;
use crate::error::{EtlError, EtlResult};
use crate::extract::time::{fmt_clock, parse_clock, Span, DAY_MINUTES};
use crate::extract::{canon_dept, extract_tel, read_depts, read_tel, read_url, Row};
use crate::municipality::{CityEntry, MunicipalityIndex};
use crate::normalize::digits_only;
use crate::record::{parse_coord, FacilityRecord, HoursKind, TimeRange};
use crate::sheet_parser::RawSheet;
use crate::tables::{resolve_pref, Category, Day, Domain};

const FACILITY_ID_COLUMNS: [&str; 5] = ["ID", "医療機関コード", "施設ID", "機関ID", "id"];
const FACILITY_NAME_COLUMNS: [&str; 4] = ["正式名称", "医療機関名称", "名称", "name"];
const FACILITY_ADDRESS_COLUMNS: [&str; 4] = ["所在地", "住所", "所在地住所", "address"];
const KANA_COLUMNS: [&str; 4] = ["正式名称（フリガナ）", "フリガナ", "事業所名カナ", "kana"];
const LAT_COLUMNS: [&str; 3] = ["所在地座標（緯度）", "緯度", "lat"];
const LNG_COLUMNS: [&str; 3] = ["所在地座標（経度）", "経度", "lng"];
const PREF_COLUMNS: [&str; 2] = ["都道府県名", "都道府県"];
const CITY_COLUMNS: [&str; 2] = ["市区町村名", "市区町村"];

const HOURS_DEPT_COLUMNS: [&str; 5] = ["診療科目名", "診療科名", "標榜科名", "診療科", "科名"];

const PHARMACY_ID_COLUMNS: [&str; 2] = ["ID", "薬局ID"];
const PHARMACY_NAME_COLUMNS: [&str; 2] = ["名称", "正式名称"];
const PHARMACY_ADDRESS_COLUMNS: [&str; 2] = ["所在地", "住所"];
/// Pseudo-department the pharmacy opening hours are filed under.
pub const PHARMACY_DEPT: &str = "薬局";
const PHARMACY_SLOTS: u32 = 4;

const CARE_ID_COLUMNS: [&str; 1] = ["事業所番号"];
const CARE_NAME_COLUMNS: [&str; 1] = ["事業所名"];
const CARE_ADDRESS_COLUMNS: [&str; 1] = ["住所"];
const CARE_BUILDING_COLUMN: &str = "方書（ビル名等）";

const MUNI_PREF_COLUMNS: [&str; 4] = ["都道府県名", "都道府県", "pref", "pref_name"];
const MUNI_CITY_COLUMNS: [&str; 5] = ["市区町村名", "市区町村", "city", "city_name", "Municipality"];
const MUNI_YOMI_COLUMNS: [&str; 7] = [
    "市区町村名カナ",
    "市区町村名かな",
    "市区町村名よみ",
    "市区町村名（カナ）",
    "市区町村名ｶﾅ",
    "city_kana",
    "city_yomi",
];

/// What a build run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    pub files: Vec<PathBuf>,
    pub records: usize,
    /// Rows dropped because no prefecture could be determined.
    pub skipped_rows: usize,
    /// Rows dropped because their ID was already seen.
    pub duplicate_ids: usize,
}

pub struct Builder<'a> {
    data_root: &'a Path,
    index: &'a MunicipalityIndex,
}

/// Records grouped by prefecture, plus the bookkeeping for one run.
#[derive(Default)]
struct Partitions {
    by_pref: BTreeMap<&'static str, Vec<FacilityRecord>>,
    seen: HashSet<String>,
    skipped_rows: usize,
    duplicate_ids: usize,
}

impl Partitions {
    fn push(&mut self, pref: &'static str, record: FacilityRecord) {
        if !self.seen.insert(record.id.clone()) {
            debug!("Duplicate facility ID {}, keeping the first row", record.id);
            self.duplicate_ids += 1;
            return;
        }
        self.by_pref.entry(pref).or_default().push(record);
    }
}

impl<'a> Builder<'a> {
    pub fn new(data_root: &'a Path, index: &'a MunicipalityIndex) -> Self {
        Self { data_root, index }
    }

    /// Hospital, clinic or dental: a facility table joined with optional
    /// department/hours and phone tables on the facility ID.
    pub fn build_medical(
        &self,
        category: Category,
        facility: &RawSheet,
        hours: Option<&RawSheet>,
        tel: Option<&RawSheet>,
    ) -> EtlResult<BuildReport> {
        if category.domain() != Domain::Medical || category == Category::Pharmacy {
            return Err(EtlError::WrongDomain {
                slug: category.slug().to_string(),
                table: "medical facility",
            });
        }
        let id_col = facility.require(&FACILITY_ID_COLUMNS)?;
        facility.require(&FACILITY_NAME_COLUMNS)?;
        facility.require(&FACILITY_ADDRESS_COLUMNS)?;
        facility.require(&KANA_COLUMNS)?;
        facility.require(&LAT_COLUMNS)?;
        facility.require(&LNG_COLUMNS)?;

        let mut parts = Partitions::default();
        let mut order: Vec<String> = Vec::new();
        let mut records: HashMap<String, (&'static str, FacilityRecord)> = HashMap::new();

        for (i, raw) in facility.rows.iter().enumerate() {
            let row = Row::from_pairs(&facility.headers, raw);
            let name = row.pick_str(&FACILITY_NAME_COLUMNS);
            let address = row.pick_str(&FACILITY_ADDRESS_COLUMNS);
            let Some((pref, city)) = self.locate(&row, &address) else {
                warn!("{} row {}: no prefecture for '{}' ({}), skipped", facility.name, i + 2, name, address);
                parts.skipped_rows += 1;
                continue;
            };
            let id = non_empty_or(facility.cell(raw, id_col), || synth_id(pref, &city, &name, &address));
            if records.contains_key(&id) {
                debug!("Duplicate facility ID {}, keeping the first row", id);
                parts.duplicate_ids += 1;
                continue;
            }

            let mut rec = FacilityRecord::new(id.clone(), name, category);
            fill_common(&mut rec, &row, pref, city, address);
            rec.departments = read_depts(&row);
            order.push(id.clone());
            records.insert(id, (pref, rec));
        }

        if let Some(hours) = hours {
            self.join_hours(hours, &mut records)?;
        }
        if let Some(tel) = tel {
            join_tel(tel, &mut records);
        }

        for id in order {
            if let Some((pref, rec)) = records.remove(&id) {
                parts.push(pref, rec);
            }
        }
        self.write_partitions(category, parts)
    }

    /// Pivot the hours table onto `records`, keeping the earliest start and
    /// latest end per (facility, department, day, kind).
    fn join_hours(
        &self,
        hours: &RawSheet,
        records: &mut HashMap<String, (&'static str, FacilityRecord)>,
    ) -> EtlResult<()> {
        let id_col = hours.require(&FACILITY_ID_COLUMNS)?;
        let dept_col = hours.require(&HOURS_DEPT_COLUMNS)?;

        let kinds = [
            (HoursKind::Consult, "診療開始時間", "診療終了時間"),
            (HoursKind::Accept, "外来受付開始時間", "外来受付終了時間"),
        ];
        let mut collapsed: BTreeMap<(String, String, HoursKind, Day), Span> = BTreeMap::new();
        let mut unknown = 0usize;

        for raw in &hours.rows {
            let id = hours.cell(raw, id_col);
            let dept = canon_dept(hours.cell(raw, dept_col));
            if id.is_empty() || dept.is_empty() {
                continue;
            }
            let Some((_, rec)) = records.get_mut(id) else {
                unknown += 1;
                continue;
            };
            if !rec.departments.contains(&dept) {
                rec.departments.push(dept.clone());
            }

            let row = Row::from_pairs(&hours.headers, raw);
            for (kind, start_suffix, end_suffix) in kinds {
                for day in Day::ALL {
                    let start = row.get(&format!("{}_{}", day.symbol(), start_suffix));
                    let end = row.get(&format!("{}_{}", day.symbol(), end_suffix));
                    let (Some(s), Some(e)) = (start, end) else {
                        continue;
                    };
                    let Some(span) = parse_span(&s, &e) else {
                        debug!("Unparsable hours {}〜{} for {}", s, e, id);
                        continue;
                    };
                    collapsed
                        .entry((id.to_string(), dept.clone(), kind, day))
                        .and_modify(|cur| {
                            *cur = Span::new(cur.start.min(span.start), cur.end.max(span.end))
                        })
                        .or_insert(span);
                }
            }
        }
        if unknown > 0 {
            debug!("{}: {} hours rows without a matching facility", hours.name, unknown);
        }

        for ((id, dept, kind, day), span) in collapsed {
            if let Some((_, rec)) = records.get_mut(&id) {
                rec.put_slot(&dept, kind, day, span_range(&span));
            }
        }
        Ok(())
    }

    /// Pharmacies: opening hours come as up to four slots per day, filed
    /// under the pseudo-department [`PHARMACY_DEPT`].
    pub fn build_pharmacy(&self, sheet: &RawSheet) -> EtlResult<BuildReport> {
        let id_col = sheet.require(&PHARMACY_ID_COLUMNS)?;
        sheet.require(&PHARMACY_NAME_COLUMNS)?;
        sheet.require(&PHARMACY_ADDRESS_COLUMNS)?;

        let mut parts = Partitions::default();
        for (i, raw) in sheet.rows.iter().enumerate() {
            let row = Row::from_pairs(&sheet.headers, raw);
            let name = row.pick_str(&PHARMACY_NAME_COLUMNS);
            let address = row.pick_str(&PHARMACY_ADDRESS_COLUMNS);
            let Some((pref, city)) = self.locate(&row, &address) else {
                warn!("{} row {}: no prefecture for '{}' ({}), skipped", sheet.name, i + 2, name, address);
                parts.skipped_rows += 1;
                continue;
            };
            let id = non_empty_or(sheet.cell(raw, id_col), || synth_id(pref, &city, &name, &address));

            let mut rec = FacilityRecord::new(id, name, Category::Pharmacy);
            fill_common(&mut rec, &row, pref, city, address);
            for day in Day::ALL {
                for n in 1..=PHARMACY_SLOTS {
                    let start = row.get(&format!("{}_開店時間帯{}_開始時間", day.symbol(), n));
                    let end = row.get(&format!("{}_開店時間帯{}_終了時間", day.symbol(), n));
                    if let (Some(s), Some(e)) = (start, end) {
                        let range = parse_span(&s, &e).map(|span| span_range(&span)).unwrap_or((s, e));
                        rec.put_slot(PHARMACY_DEPT, HoursKind::Consult, day, range);
                    }
                }
            }
            parts.push(pref, rec);
        }
        self.write_partitions(Category::Pharmacy, parts)
    }

    /// One long-term-care service table.
    pub fn build_care(&self, category: Category, sheet: &RawSheet) -> EtlResult<BuildReport> {
        if category.domain() != Domain::Care {
            return Err(EtlError::WrongDomain {
                slug: category.slug().to_string(),
                table: "care service",
            });
        }
        sheet.require(&CARE_NAME_COLUMNS)?;
        sheet.require(&CARE_ADDRESS_COLUMNS)?;

        let mut parts = Partitions::default();
        for (i, raw) in sheet.rows.iter().enumerate() {
            let row = Row::from_pairs(&sheet.headers, raw);
            let name = row.pick_str(&CARE_NAME_COLUMNS);
            let street = row.pick_str(&CARE_ADDRESS_COLUMNS);
            let Some((pref, city)) = self.locate(&row, &street) else {
                warn!("{} row {}: no prefecture for '{}' ({}), skipped", sheet.name, i + 2, name, street);
                parts.skipped_rows += 1;
                continue;
            };
            let address = match row.get(CARE_BUILDING_COLUMN) {
                Some(building) => format!("{} {}", street, building),
                None => street,
            };
            let id = row
                .pick(&CARE_ID_COLUMNS)
                .unwrap_or_else(|| synth_id(pref, &city, &name, &address));

            let mut rec = FacilityRecord::new(id, name, category);
            fill_common(&mut rec, &row, pref, city, address);
            rec.kind_label = Some(category.label().to_string());
            rec.service_type = row.get("サービスの種類");
            rec.capacity = row
                .get("定員")
                .map(|c| digits_only(&c))
                .and_then(|d| d.parse().ok());
            rec.open_days = row
                .get("利用可能曜日")
                .map(|d| split_open_days(&d))
                .unwrap_or_default();
            rec.open_days_note = row.get("利用可能曜日特記事項");
            parts.push(pref, rec);
        }
        self.write_partitions(category, parts)
    }

    /// Prefecture and city for a row. Explicit columns win over the address.
    fn locate(&self, row: &Row, address: &str) -> Option<(&'static str, String)> {
        let explicit_city = row.pick(&CITY_COLUMNS);
        match row.pick(&PREF_COLUMNS).and_then(|p| resolve_pref(&p)) {
            Some(pref) => {
                let city = explicit_city.unwrap_or_else(|| self.index.infer_city(pref, address));
                Some((pref, city))
            }
            None => match self.index.infer(address) {
                (Some(pref), inferred) => Some((pref, explicit_city.unwrap_or(inferred))),
                (None, _) => None,
            },
        }
    }

    fn write_partitions(&self, category: Category, parts: Partitions) -> EtlResult<BuildReport> {
        let dir = self
            .data_root
            .join(category.domain().dir())
            .join(category.slug());
        std::fs::create_dir_all(&dir)?;

        let mut report = BuildReport {
            skipped_rows: parts.skipped_rows,
            duplicate_ids: parts.duplicate_ids,
            ..Default::default()
        };
        for (pref, mut records) in parts.by_pref {
            records.sort_by_cached_key(|r| (sort_key(&r.city), sort_key(&r.name), r.id.clone()));
            let path = dir.join(format!("{}.json", pref));
            write_json(&path, &records)?;
            info!("wrote: {:?} ({} {})", path, records.len(), category.slug());
            report.records += records.len();
            report.files.push(path);
        }
        Ok(report)
    }
}

/// Build `<data-root>/pref/<pref>.json` from a municipality code table.
///
/// A prefecture whose rows carry any reading gets `{name, yomi}` objects;
/// otherwise plain names. Without a reading header, a two-column header
/// with a third data cell treats that cell as the reading.
pub fn build_municipalities(data_root: &Path, sheet: &RawSheet) -> EtlResult<BuildReport> {
    let pref_col = sheet.require(&MUNI_PREF_COLUMNS)?;
    let city_col = sheet.require(&MUNI_CITY_COLUMNS)?;
    let yomi_col = sheet
        .column(&MUNI_YOMI_COLUMNS)
        .or_else(|| (sheet.headers.len() < 3).then_some(2));

    let mut by_pref: BTreeMap<&'static str, Vec<(String, String)>> = BTreeMap::new();
    let mut report = BuildReport::default();
    for raw in &sheet.rows {
        let name = sheet.cell(raw, city_col);
        if name.is_empty() {
            continue;
        }
        let Some(pref) = resolve_pref(sheet.cell(raw, pref_col)) else {
            report.skipped_rows += 1;
            continue;
        };
        let yomi = yomi_col.map(|c| sheet.cell(raw, c)).unwrap_or("");
        let entries = by_pref.entry(pref).or_default();
        if entries.iter().any(|(n, _)| n == name) {
            report.duplicate_ids += 1;
            continue;
        }
        entries.push((name.to_string(), yomi.to_string()));
    }

    let dir = data_root.join("pref");
    std::fs::create_dir_all(&dir)?;
    for (pref, mut entries) in by_pref {
        entries.sort_by_cached_key(|(name, _)| (sort_key(name), name.clone()));
        let has_yomi = entries.iter().any(|(_, y)| !y.is_empty());
        let out: Vec<CityEntry> = entries
            .into_iter()
            .map(|(name, yomi)| {
                if has_yomi {
                    CityEntry::WithYomi { name, yomi }
                } else {
                    CityEntry::Name(name)
                }
            })
            .collect();
        let path = dir.join(format!("{}.json", pref));
        write_json(&path, &out)?;
        info!("wrote: {:?} ({} items, yomi: {})", path, out.len(), if has_yomi { "yes" } else { "no" });
        report.records += out.len();
        report.files.push(path);
    }
    Ok(report)
}

/// Fill empty phone numbers from a phone table: ID in the first column
/// unless a known ID header exists, number in the first cell that formats.
/// Stored numbers that fail to format were already dropped by [`read_tel`].
fn join_tel(sheet: &RawSheet, records: &mut HashMap<String, (&'static str, FacilityRecord)>) {
    let id_col = sheet.column(&FACILITY_ID_COLUMNS).unwrap_or(0);
    let mut filled = 0usize;
    for raw in &sheet.rows {
        let Some((_, rec)) = records.get_mut(sheet.cell(raw, id_col)) else {
            continue;
        };
        if !rec.tel.is_empty() {
            continue;
        }
        let tel = raw
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != id_col)
            .map(|(_, cell)| extract_tel(cell))
            .find(|t| !t.is_empty());
        if let Some(tel) = tel {
            rec.tel = tel;
            filled += 1;
        }
    }
    debug!("{}: filled {} phone numbers", sheet.name, filled);
}

fn fill_common(rec: &mut FacilityRecord, row: &Row, pref: &'static str, city: String, address: String) {
    rec.kana = row.pick_str(&KANA_COLUMNS);
    rec.address = address;
    rec.pref = pref.to_string();
    rec.city = city;
    rec.lat = row.pick(&LAT_COLUMNS).and_then(|v| parse_coord(&v));
    rec.lng = row.pick(&LNG_COLUMNS).and_then(|v| parse_coord(&v));
    rec.tel = read_tel(row);
    rec.url = read_url(row);
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> EtlResult<()> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    std::fs::write(path, body)?;
    Ok(())
}

fn non_empty_or(value: &str, fallback: impl FnOnce() -> String) -> String {
    if value.is_empty() {
        fallback()
    } else {
        value.to_string()
    }
}

/// Stable ID from location and name when the source has no facility code.
pub fn synth_id(pref: &str, city: &str, name: &str, address: &str) -> String {
    [pref, city, name, address]
        .concat()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn parse_span(start: &str, end: &str) -> Option<Span> {
    Some(Span::new(parse_clock(start)?, parse_clock(end)?))
}

/// `("HH:MM", "HH:MM")`, with `翌` on an end past midnight.
fn span_range(span: &Span) -> TimeRange {
    let end = if span.end >= DAY_MINUTES {
        format!("翌{}", fmt_clock(span.end))
    } else {
        fmt_clock(span.end)
    };
    (fmt_clock(span.start), end)
}

fn split_open_days(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c == '、' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet_parser::parse_csv;
    use serde_json::Value;

    fn sheet(name: &str, csv: &str) -> RawSheet {
        parse_csv(name, csv.as_bytes()).unwrap()
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn tokyo_index() -> MunicipalityIndex {
        MunicipalityIndex::from_lists([("東京都", vec!["新宿区", "渋谷区", "八王子市"])])
    }

    const FACILITY_CSV: &str = "\
ID,正式名称,正式名称（フリガナ）,所在地,所在地座標（緯度）,所在地座標（経度）,案内用ホームページアドレス,電話番号
H2,渋谷中央病院,シブヤチュウオウビョウイン,東京都渋谷区道玄坂1-1,35.65,139.70,shibuya-hp.or.jp,03-1111-2222
H1,新宿西口病院,シンジュクニシグチビョウイン,東京都新宿区西新宿1-1,0,0,,03-3333-4444
H3,どこか病院,,住所不明,,,,
H1,重複病院,,東京都新宿区西新宿9-9,,,,
";

    const HOURS_CSV: &str = "\
ID,診療科目名,診療時間帯,月_診療開始時間,月_診療終了時間,月_外来受付開始時間,月_外来受付終了時間
H1,内科,1,09:00,12:00,08:30,11:30
H1,内科,2,14:00,17:00,13:30,16:30
H1,耳鼻科,1,10:00,12:00,,
H9,内科,1,09:00,12:00,,
";

    #[test]
    fn test_build_medical_join() {
        let dir = tempfile::tempdir().unwrap();
        let index = tokyo_index();
        let builder = Builder::new(dir.path(), &index);
        let report = builder
            .build_medical(
                Category::Hospital,
                &sheet("hospital_facility", FACILITY_CSV),
                Some(&sheet("hospital_hours", HOURS_CSV)),
                None,
            )
            .unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.duplicate_ids, 1);

        let path = dir.path().join("medical/hospital/東京都.json");
        let out = read(&path);
        let items = out.as_array().unwrap();
        assert_eq!(items.len(), 2);

        let h1 = items.iter().find(|i| i["id"] == "H1").unwrap();
        assert_eq!(h1["city"], "新宿区");
        assert_eq!(h1["lat"], Value::Null);
        assert_eq!(h1["tel"], "03-3333-4444");
        assert_eq!(h1["hours"]["内科"]["consult"]["月"][0][0], "09:00");
        assert_eq!(h1["hours"]["内科"]["consult"]["月"][0][1], "17:00");
        assert_eq!(h1["hours"]["内科"]["accept"]["月"][0][0], "08:30");
        assert_eq!(h1["hours"]["耳鼻咽喉科"]["consult"]["月"][0][0], "10:00");
        assert_eq!(h1["departments"], serde_json::json!(["内科", "耳鼻咽喉科"]));

        let h2 = items.iter().find(|i| i["id"] == "H2").unwrap();
        assert_eq!(h2["url"], "https://shibuya-hp.or.jp");
        assert_eq!(h2["lat"], 35.65);
        assert!(h2.get("hours").is_none());
    }

    #[test]
    fn test_build_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let index = tokyo_index();
        let builder = Builder::new(dir.path(), &index);
        let facility = sheet("f", FACILITY_CSV);
        let hours = sheet("h", HOURS_CSV);
        let path = dir.path().join("medical/clinic/東京都.json");

        builder.build_medical(Category::Clinic, &facility, Some(&hours), None).unwrap();
        let first = std::fs::read(&path).unwrap();
        builder.build_medical(Category::Clinic, &facility, Some(&hours), None).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), first);
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let index = MunicipalityIndex::empty();
        let builder = Builder::new(dir.path(), &index);
        let err = builder
            .build_medical(Category::Hospital, &sheet("f", "ID,正式名称\n1,a\n"), None, None)
            .unwrap_err();
        assert!(matches!(err, EtlError::MissingColumn { .. }));
        assert!(!dir.path().join("medical").exists());

        let err = builder
            .build_medical(Category::Tokuyou, &sheet("f", FACILITY_CSV), None, None)
            .unwrap_err();
        assert!(matches!(err, EtlError::WrongDomain { .. }));
    }

    #[test]
    fn test_kana_and_coordinates_are_required() {
        let dir = tempfile::tempdir().unwrap();
        let index = MunicipalityIndex::empty();
        let builder = Builder::new(dir.path(), &index);
        let no_kana = "ID,正式名称,所在地,緯度,経度\n1,a,東京都新宿区1,35.6,139.7\n";
        let no_lng = "ID,正式名称,フリガナ,所在地,緯度\n1,a,エー,東京都新宿区1,35.6\n";
        for csv in [no_kana, no_lng] {
            let err = builder
                .build_medical(Category::Clinic, &sheet("f", csv), None, None)
                .unwrap_err();
            assert!(matches!(err, EtlError::MissingColumn { .. }));
        }
        let complete = "ID,正式名称,フリガナ,所在地,緯度,経度\n1,a,エー,東京都新宿区1,35.6,139.7\n";
        let report = builder
            .build_medical(Category::Clinic, &sheet("f", complete), None, None)
            .unwrap();
        assert_eq!(report.records, 1);
    }

    #[test]
    fn test_hours_department_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let index = tokyo_index();
        let builder = Builder::new(dir.path(), &index);
        let hours = "\
ID,標榜科名,月_診療開始時間,月_診療終了時間
H1,眼科,09:00,12:00
";
        builder
            .build_medical(Category::Hospital, &sheet("f", FACILITY_CSV), Some(&sheet("h", hours)), None)
            .unwrap();
        let out = read(&dir.path().join("medical/hospital/東京都.json"));
        let h1 = out.as_array().unwrap().iter().find(|i| i["id"] == "H1").unwrap();
        assert_eq!(h1["hours"]["眼科"]["consult"]["月"][0], serde_json::json!(["09:00", "12:00"]));
    }

    #[test]
    fn test_tel_table_fills_empty_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let index = tokyo_index();
        let builder = Builder::new(dir.path(), &index);
        let facility = "\
ID,正式名称,フリガナ,所在地,緯度,経度,電話番号
C1,あおば医院,アオバイイン,東京都新宿区西新宿1-1,,,1311132
C2,みどり医院,ミドリイイン,東京都新宿区新宿3-1,,,03-1111-2222
C3,ひかり医院,ヒカリイイン,東京都渋谷区道玄坂1-1,,,
";
        let tel = "\
医療機関コード,備考,電話番号
C1,,0333334444
C2,,03-9999-9999
C9,,03-5555-6666
";
        builder
            .build_medical(Category::Clinic, &sheet("f", facility), None, Some(&sheet("clinic_tel", tel)))
            .unwrap();
        let out = read(&dir.path().join("medical/clinic/東京都.json"));
        let tel_of = |id: &str| {
            out.as_array().unwrap().iter().find(|i| i["id"] == id).unwrap()["tel"].clone()
        };
        assert_eq!(tel_of("C1"), "03-3333-4444");
        assert_eq!(tel_of("C2"), "03-1111-2222");
        assert_eq!(tel_of("C3"), "");
    }

    #[test]
    fn test_build_pharmacy_slots() {
        let dir = tempfile::tempdir().unwrap();
        let index = MunicipalityIndex::empty();
        let builder = Builder::new(dir.path(), &index);
        let csv = "\
ID,名称,フリガナ,所在地,月_開店時間帯1_開始時間,月_開店時間帯1_終了時間,月_開店時間帯2_開始時間,月_開店時間帯2_終了時間
P1,あおば薬局,アオバヤッキョク,大阪府吹田市江坂町1-2,9:00,13:00,14:00,19:00
";
        builder.build_pharmacy(&sheet("pharmacy", csv)).unwrap();
        let out = read(&dir.path().join("medical/pharmacy/大阪府.json"));
        let rec = &out[0];
        assert_eq!(rec["city"], "吹田市");
        assert_eq!(rec["category"], "pharmacy");
        let monday = &rec["hours"]["薬局"]["consult"]["月"];
        assert_eq!(monday.as_array().unwrap().len(), 2);
        assert_eq!(monday[1], serde_json::json!(["14:00", "19:00"]));
    }

    #[test]
    fn test_build_care_fields() {
        let dir = tempfile::tempdir().unwrap();
        let index = MunicipalityIndex::empty();
        let builder = Builder::new(dir.path(), &index);
        let csv = "\
都道府県名,市区町村名,事業所名,事業所名カナ,住所,方書（ビル名等）,電話番号,FAX番号,事業所番号,利用可能曜日,利用可能曜日特記事項,定員,サービスの種類
東京都,八王子市,ひだまり苑,ヒダマリエン,八王子市元本郷町1-1,ひだまりビル2F,042-111-2222,042-111-3333,1371234567,月、火 水,年末年始休み,\"1,20\",介護老人福祉施設
";
        builder.build_care(Category::Tokuyou, &sheet("care", csv)).unwrap();
        let out = read(&dir.path().join("care/tokuyou/東京都.json"));
        let rec = &out[0];
        assert_eq!(rec["id"], "1371234567");
        assert_eq!(rec["address"], "八王子市元本郷町1-1 ひだまりビル2F");
        assert_eq!(rec["city"], "八王子市");
        assert_eq!(rec["tel"], "042-111-2222");
        assert_eq!(rec["kindLabel"], "特別養護老人ホーム");
        assert_eq!(rec["serviceType"], "介護老人福祉施設");
        assert_eq!(rec["capacity"], 120);
        assert_eq!(rec["openDays"], serde_json::json!(["月", "火", "水"]));
        assert_eq!(rec["openDaysNote"], "年末年始休み");
    }

    #[test]
    fn test_build_municipalities() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "\
団体コード,都道府県名,市区町村名,市区町村名カナ
131016,東京都,千代田区,チヨダク
131016,東京都,千代田区,チヨダク
011002,北海道,札幌市,
";
        let report = build_municipalities(dir.path(), &sheet("jis", csv)).unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.duplicate_ids, 1);

        let tokyo = read(&dir.path().join("pref/東京都.json"));
        assert_eq!(tokyo, serde_json::json!([{"name": "千代田区", "yomi": "チヨダク"}]));
        let hokkaido = read(&dir.path().join("pref/北海道.json"));
        assert_eq!(hokkaido, serde_json::json!(["札幌市"]));

        let index = MunicipalityIndex::load(dir.path()).unwrap();
        assert_eq!(index.cities("東京都"), ["千代田区"]);
    }

    #[test]
    fn test_synth_id() {
        assert_eq!(synth_id("東京都", "新宿区", "あおば 医院", "西新宿 1-1"), "東京都新宿区あおば医院西新宿1-1");
    }
}
