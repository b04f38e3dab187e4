//! The on-disk snapshot: a single parquet file holding the full measurement table.

use crate::measurements::error::MeasurementError;
use crate::types::measurement::MeasurementFrame;
use log::info;
use polars::prelude::*;
use std::path::Path;
use tokio::{fs, task};

pub async fn snapshot_exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

pub async fn read_snapshot(path: &Path) -> Result<MeasurementFrame, MeasurementError> {
    let path_buf = path.to_path_buf();
    let frame = task::spawn_blocking(move || {
        let file = std::fs::File::open(&path_buf)
            .map_err(|e| MeasurementError::SnapshotRead(path_buf.clone(), e))?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| MeasurementError::SnapshotDecode(path_buf, e))
    })
    .await??;
    info!("Read {} measurements from snapshot {:?}", frame.height(), path);
    Ok(MeasurementFrame::new(frame))
}

/// Writes the snapshot next to its final location first and renames it into place, so an
/// interrupted write never leaves a truncated snapshot behind.
pub async fn write_snapshot(
    measurements: &MeasurementFrame,
    path: &Path,
) -> Result<(), MeasurementError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| MeasurementError::SnapshotDirCreation(parent.to_path_buf(), e))?;
    }

    let mut df = measurements.frame().clone();
    let final_path = path.to_path_buf();
    let partial_path = path.with_extension("parquet.partial");
    task::spawn_blocking(move || {
        let file = std::fs::File::create(&partial_path)
            .map_err(|e| MeasurementError::SnapshotWriteIo(partial_path.clone(), e))?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut df)
            .map_err(|e| MeasurementError::SnapshotWritePolars(partial_path.clone(), e))?;
        std::fs::rename(&partial_path, &final_path)
            .map_err(|e| MeasurementError::SnapshotWriteIo(final_path, e))?;
        Ok::<(), MeasurementError>(())
    })
    .await??;
    info!(
        "Wrote {} measurements to snapshot {:?}",
        measurements.height(),
        path
    );
    Ok(())
}
