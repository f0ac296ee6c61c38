//! Per-field extractors over raw facility rows.
//!
//! Every extractor is total: dirty input yields an empty value, never an
//! error.

pub mod closed;
pub mod dept;
pub mod hours;
pub mod night;
pub mod row;
pub mod tel;
pub mod time;
pub mod url;

pub use closed::read_closed;
pub use dept::{canon_dept, read_depts};
pub use hours::read_hours;
pub use night::{night_label, night_source_text};
pub use row::Row;
pub use tel::{extract_tel, read_tel};
pub use url::read_url;
