use chrono::NaiveDate;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeasurementError {
    #[error("Invalid measurement URL template '{0}'")]
    InvalidUrlTemplate(String),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Data download or decompression failed")]
    DownloadIo(#[from] std::io::Error),

    #[error("Parsing error processing measurement file for {date}")]
    CsvRead {
        date: NaiveDate,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to create snapshot directory '{0}'")]
    SnapshotDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read snapshot file '{0}'")]
    SnapshotRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode snapshot file '{0}'")]
    SnapshotDecode(PathBuf, #[source] PolarsError),

    #[error("I/O error writing snapshot file '{0}'")]
    SnapshotWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing snapshot file '{0}'")]
    SnapshotWritePolars(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
