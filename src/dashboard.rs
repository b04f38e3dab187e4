//! The owning pipeline object: loads the registry and the measurement table once and
//! keeps them, with the pollutant ordering, for the lifetime of the process.

use crate::aggregate::pollutants;
use crate::config::DashboardConfig;
use crate::error::DashboardError;
use crate::measurements::loader::MeasurementLoader;
use crate::presentation::adapter::Presenter;
use crate::stations::registry::StationRegistryLoader;
use crate::types::measurement::MeasurementFrame;
use crate::types::station::Station;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir, SNAPSHOT_FILE_NAME};
use log::info;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Dashboard {
    stations: Vec<Station>,
    measurements: MeasurementFrame,
    pollutants: Vec<String>,
}

impl Dashboard {
    /// Cold load: reads the registry, then the measurement snapshot (downloading and
    /// writing it first when it does not exist yet).
    ///
    /// # Errors
    ///
    /// Fails when the registry cannot be read, the snapshot cannot be read or written, or
    /// the default cache directory cannot be resolved or created. Individual measurement
    /// days that cannot be fetched are skipped.
    pub async fn load(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let snapshot_path = match &config.snapshot_path {
            Some(path) => path.clone(),
            None => default_snapshot_path().await?,
        };

        let stations = StationRegistryLoader::new(&config.registry_sheet)
            .load(&config.registry_source)
            .await?;
        let measurements = MeasurementLoader::new(&config.measurement_url_template, snapshot_path)?
            .load(config.period)
            .await?;
        Self::from_parts(stations, measurements)
    }

    /// Builds a dashboard from already loaded data.
    pub fn from_parts(
        stations: Vec<Station>,
        measurements: MeasurementFrame,
    ) -> Result<Self, DashboardError> {
        let pollutants = pollutants(&measurements)?;
        info!(
            "Dashboard ready: {} stations, {} measurements, pollutants {:?}",
            stations.len(),
            measurements.height(),
            pollutants
        );
        Ok(Self {
            stations,
            measurements,
            pollutants,
        })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn measurements(&self) -> &MeasurementFrame {
        &self.measurements
    }

    /// Distinct pollutants in order of first appearance in the measurement table.
    pub fn pollutants(&self) -> &[String] {
        &self.pollutants
    }

    pub fn presenter(&self) -> Presenter<'_> {
        Presenter::new(self)
    }
}

async fn default_snapshot_path() -> Result<PathBuf, DashboardError> {
    let cache_folder = get_cache_dir().map_err(DashboardError::CacheDirResolution)?;
    ensure_cache_dir_exists(&cache_folder)
        .await
        .map_err(|e| DashboardError::CacheDirCreation(cache_folder.clone(), e))?;
    Ok(cache_folder.join(SNAPSHOT_FILE_NAME))
}
