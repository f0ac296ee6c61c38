use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for the record builder and the data loaders it relies on.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("{table}: required column not found (tried {candidates:?})")]
    MissingColumn {
        table: String,
        candidates: Vec<String>,
    },
    #[error("{}: CSV has no header row", .path.display())]
    EmptyTable { path: PathBuf },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("category '{slug}' cannot be built from {table} data")]
    WrongDomain { slug: String, table: &'static str },
}

pub type EtlResult<T> = Result<T, EtlError>;
