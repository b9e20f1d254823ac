use std::path::PathBuf;

use thiserror::Error;

/// Why a single table row was left out of a calculation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing course name")]
    MissingName,

    #[error("missing score")]
    MissingScore,

    #[error("score {0} is outside 0-100")]
    ScoreOutOfRange(f64),

    #[error("malformed score '{0}'")]
    MalformedScore(String),

    #[error("unrecognized grade category '{0}'")]
    UnrecognizedCategory(String),

    #[error("invalid credit '{0}'")]
    InvalidCredit(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcError {
    #[error("no usable data: {0}")]
    NoUsableData(NoDataReason),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    #[error("no valid course records")]
    NoRecords,

    #[error("total credit is zero")]
    ZeroCredit,
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook {} has no worksheet", .path.display())]
    NoWorksheet { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error(
        "history storage unavailable: {} ({primary_err}); fallback {} ({fallback_err})",
        .primary.display(),
        .fallback.display()
    )]
    StorageUnavailable {
        primary: PathBuf,
        fallback: PathBuf,
        primary_err: std::io::Error,
        fallback_err: std::io::Error,
    },

    #[error("history I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported history file version: {0}")]
    UnsupportedVersion(u32),

    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
