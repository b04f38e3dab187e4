use crate::measurements::error::MeasurementError;
use crate::measurements::snapshot::{read_snapshot, snapshot_exists, write_snapshot};
use crate::measurements::upstream::parse_daily_csv;
use crate::types::date_range::DateRange;
use crate::types::measurement::MeasurementFrame;
use async_compression::tokio::bufread::GzipDecoder;
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use futures_util::TryStreamExt;
use log::{debug, info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio::task;
use tokio_util::io::StreamReader;

/// Real-time daily files published by the national reference laboratory.
pub const DEFAULT_MEASUREMENT_URL_TEMPLATE: &str = "https://files.data.gouv.fr/lcsqa/concentrations-de-polluants-atmospheriques-reglementes/temps-reel/%Y/FR_E2_%Y-%m-%d.csv";

/// Loads the measurement table, either from the local snapshot or by downloading one
/// file per day.
///
/// Downloads are best effort: a day whose file is missing (non-success status), cannot be
/// reached or cannot be parsed is skipped. Days are fetched one at a time, in order.
pub struct MeasurementLoader {
    client: Client,
    url_template: String,
    snapshot_path: PathBuf,
}

impl MeasurementLoader {
    /// `url_template` is a chrono `strftime` pattern rendered once per day.
    pub fn new(
        url_template: impl Into<String>,
        snapshot_path: impl Into<PathBuf>,
    ) -> Result<Self, MeasurementError> {
        let url_template = url_template.into();
        if StrftimeItems::new(&url_template).any(|item| matches!(item, Item::Error)) {
            return Err(MeasurementError::InvalidUrlTemplate(url_template));
        }
        Ok(Self {
            client: Client::new(),
            url_template,
            snapshot_path: snapshot_path.into(),
        })
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    pub fn day_url(&self, date: NaiveDate) -> String {
        date.format(&self.url_template).to_string()
    }

    /// Returns the snapshot if one exists, without touching the network. Otherwise fetches
    /// every day of `period`, concatenates the files in fetch order and writes the snapshot.
    ///
    /// When no day could be fetched an empty table is returned and no snapshot is written.
    pub async fn load(&self, period: DateRange) -> Result<MeasurementFrame, MeasurementError> {
        if snapshot_exists(&self.snapshot_path).await {
            info!("Snapshot hit at {:?}", self.snapshot_path);
            return read_snapshot(&self.snapshot_path).await;
        }

        warn!(
            "No snapshot at {:?}. Downloading measurements for {}",
            self.snapshot_path, period
        );
        let mut frames = Vec::new();
        for date in period.days() {
            match self.fetch_day(date).await {
                Ok(Some(frame)) => frames.push(frame.lazy()),
                Ok(None) => {}
                Err(e) => warn!("Skipping measurements for {}: {}", date, e),
            }
        }

        if frames.is_empty() {
            warn!(
                "No measurement file could be fetched for {}; snapshot not written",
                period
            );
            return Ok(MeasurementFrame::empty()?);
        }

        let days = frames.len();
        let combined = concat(frames, UnionArgs::default())?.collect()?;
        let measurements = MeasurementFrame::new(combined);
        info!(
            "Fetched {} measurements over {} day files",
            measurements.height(),
            days
        );
        write_snapshot(&measurements, &self.snapshot_path).await?;
        Ok(measurements)
    }

    async fn fetch_day(&self, date: NaiveDate) -> Result<Option<DataFrame>, MeasurementError> {
        let Some(bytes) = self.download(date).await? else {
            return Ok(None);
        };
        let frame = task::spawn_blocking(move || parse_daily_csv(bytes))
            .await?
            .map_err(|source| MeasurementError::CsvRead { date, source })?;
        Ok(Some(frame))
    }

    /// `Ok(None)` when the server answers with a non-success status.
    async fn download(&self, date: NaiveDate) -> Result<Option<Vec<u8>>, MeasurementError> {
        let url = self.day_url(date);
        info!("Downloading measurements from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MeasurementError::NetworkRequest(url.clone(), e))?;

        if !response.status().is_success() {
            debug!("Skipping {}: status {}", url, response.status());
            return Ok(None);
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let mut reader = StreamReader::new(stream);
        let mut body = Vec::new();
        if url.ends_with(".gz") {
            let mut decoder = GzipDecoder::new(reader);
            decoder.read_to_end(&mut body).await?;
        } else {
            reader.read_to_end(&mut body).await?;
        }
        debug!("Downloaded {} bytes from {}", body.len(), url);
        Ok(Some(body))
    }
}
