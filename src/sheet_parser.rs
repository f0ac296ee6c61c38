//! CSV parsing for the ministry open-data exports.
//!
//! Files come as UTF-8 (often with a BOM) or as Shift_JIS. Quoting follows
//! RFC 4180, including `""` escapes and embedded commas/newlines.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::SHIFT_JIS;

use crate::error::{EtlError, EtlResult};

/// A parsed CSV table. Header and cell values are trimmed.
#[derive(Debug, Clone)]
pub struct RawSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Index of the first header among `candidates`, in candidate order.
    pub fn column(&self, candidates: &[&str]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|c| self.headers.iter().position(|h| h == c))
    }

    /// Same as [`RawSheet::column`], but a missing column is an error.
    pub fn require(&self, candidates: &[&str]) -> EtlResult<usize> {
        self.column(candidates).ok_or_else(|| EtlError::MissingColumn {
            table: self.name.clone(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Cell at `col`, empty when the row is short.
    pub fn cell<'a>(&self, row: &'a [String], col: usize) -> &'a str {
        row.get(col).map(String::as_str).unwrap_or("")
    }
}

/// Decode raw bytes: UTF-8 with the BOM removed, or Shift_JIS when the bytes
/// are not valid UTF-8.
pub fn decode(data: &[u8]) -> Cow<'_, str> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (text, _, had_errors) = SHIFT_JIS.decode(data);
            if had_errors {
                tracing::warn!("CSV is neither valid UTF-8 nor clean Shift_JIS; replacement characters inserted");
            }
            text
        }
    }
}

/// Parse a CSV file from disk.
pub fn read_csv(path: &Path) -> EtlResult<RawSheet> {
    let data = std::fs::read(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let sheet = parse_csv(&name, &data)?;
    if sheet.headers.is_empty() {
        return Err(EtlError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    Ok(sheet)
}

/// Parse CSV bytes into a [`RawSheet`]. Completely empty rows are skipped.
pub fn parse_csv(name: &str, data: &[u8]) -> EtlResult<RawSheet> {
    let text = decode(data);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    // A header line of bare commas counts as no header.
    let headers = if headers.iter().all(|h| h.is_empty()) {
        Vec::new()
    } else {
        headers
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let values: Vec<String> = record.iter().map(|f| f.trim().to_string()).collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(values);
    }

    Ok(RawSheet {
        name: name.to_string(),
        headers,
        rows,
    })
}
