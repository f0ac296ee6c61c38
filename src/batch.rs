//! One-shot build of every medical category from a dated MHLW export tree.
//!
//! The export directory holds one folder per release named `YYYY-MM-DD`.
//! Each table is taken from the newest folder that carries it.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::builder::{BuildReport, Builder};
use crate::error::EtlResult;
use crate::municipality::MunicipalityIndex;
use crate::sheet_parser::read_csv;
use crate::tables::Category;

static RE_RELEASE_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// File name prefixes of the facility and hours tables per category.
const MEDICAL_TABLES: [(Category, &str, &str); 3] = [
    (Category::Hospital, "01-1_hospital_facility_info_", "01-2_hospital_speciality_hours_"),
    (Category::Clinic, "02-1_clinic_facility_info_", "02-2_clinic_speciality_hours_"),
    (Category::Dental, "03-1_dental_facility_info_", "03-2_dental_speciality_hours_"),
];

const PHARMACY_TABLE: &str = "05_pharmacy_";

/// Release folders under `mhlw_dir`, newest first.
pub fn release_dirs(mhlw_dir: &Path) -> EtlResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(mhlw_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(|n| RE_RELEASE_DIR.is_match(n)) {
            dirs.push(entry.path());
        }
    }
    dirs.sort_unstable_by(|a, b| b.cmp(a));
    Ok(dirs)
}

/// Newest CSV whose file name satisfies `matches`.
pub fn latest_table(mhlw_dir: &Path, matches: impl Fn(&str) -> bool) -> EtlResult<Option<PathBuf>> {
    for dir in release_dirs(mhlw_dir)? {
        let mut names: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(".csv") && matches(n))
            .collect();
        names.sort();
        if let Some(name) = names.into_iter().next() {
            return Ok(Some(dir.join(name)));
        }
    }
    Ok(None)
}

/// Hospital, clinic, dental and pharmacy from the newest release. A
/// category without a facility table is skipped with a warning.
pub fn build_all(
    data_root: &Path,
    index: &MunicipalityIndex,
    mhlw_dir: &Path,
) -> EtlResult<Vec<(Category, BuildReport)>> {
    let builder = Builder::new(data_root, index);
    let mut reports = Vec::new();

    for (category, facility_prefix, hours_prefix) in MEDICAL_TABLES {
        let Some(facility) = latest_table(mhlw_dir, |n| n.starts_with(facility_prefix))? else {
            warn!("{}: no {}*.csv under {:?}, skipped", category.slug(), facility_prefix, mhlw_dir);
            continue;
        };
        let hours = latest_table(mhlw_dir, |n| n.starts_with(hours_prefix))?;
        let tel_marker = format!("_{}_tel_", category.slug());
        let tel = latest_table(mhlw_dir, |n| n.contains(&tel_marker))?;
        info!("{}: facility {:?}, hours {:?}, tel {:?}", category.slug(), facility, hours, tel);

        let facility = read_csv(&facility)?;
        let hours = hours.as_deref().map(read_csv).transpose()?;
        let tel = tel.as_deref().map(read_csv).transpose()?;
        let report = builder.build_medical(category, &facility, hours.as_ref(), tel.as_ref())?;
        reports.push((category, report));
    }

    match latest_table(mhlw_dir, |n| n.starts_with(PHARMACY_TABLE))? {
        Some(path) => {
            info!("pharmacy: {:?}", path);
            let report = builder.build_pharmacy(&read_csv(&path)?)?;
            reports.push((Category::Pharmacy, report));
        }
        None => warn!("pharmacy: no {}*.csv under {:?}, skipped", PHARMACY_TABLE, mhlw_dir),
    }
    Ok(reports)
}
