use thiserror::Error;

/// Result alias used across the dashboard pipeline
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Everything that can go wrong between retrieving the sheet and handing an export back.
///
/// None of these are fatal to a running session: callers degrade to an empty or partial
/// result and surface a notice instead.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to retrieve dataset: {0}")]
    Retrieval(String),

    #[error("Malformed record: expected at least {expected} fields, found {found}")]
    MalformedRecord { expected: usize, found: usize },

    #[error("Invalid {field} criterion: {value:?} is not a recognised date")]
    InvalidCriterion { field: &'static str, value: String },

    #[error("ไม่พบข้อมูลที่จะดาวน์โหลด")]
    NothingToExport,

    #[error("Record {0} is not part of the current result")]
    RecordNotFound(usize),

    #[error("Export already in progress")]
    ExportInProgress,

    #[error("เกิดข้อผิดพลาดในการสร้าง PDF: {0}")]
    Render(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "web")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
