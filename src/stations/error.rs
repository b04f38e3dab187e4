use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read station registry file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode station registry spreadsheet")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Failed to read delimited station registry")]
    Csv(#[from] csv::Error),

    #[error("Sheet '{sheet}' not found in station registry (available: {available:?})")]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },

    #[error("Station registry has no header row at offset {0}")]
    MissingHeaderRow(usize),

    #[error("Required column '{0}' not found in station registry header")]
    MissingColumn(String),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
