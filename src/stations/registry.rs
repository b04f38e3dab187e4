use crate::stations::error::RegistryError;
use crate::stations::header::{StationColumns, HEADER_ROW_OFFSET};
use crate::stations::sheet::{RawSheet, RegistryFormat};
use crate::types::station::Station;
use log::{debug, info, warn};
use reqwest::Client;
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use tokio::task;

/// Sheet holding the measurement points in the published workbook.
pub const DEFAULT_REGISTRY_SHEET: &str = "Points de mesure";

/// Where the station registry is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    Url(String),
    Path(PathBuf),
}

impl RegistrySource {
    fn format(&self) -> RegistryFormat {
        match self {
            RegistrySource::Url(url) => RegistryFormat::from_location(url),
            RegistrySource::Path(path) => RegistryFormat::from_location(&path.to_string_lossy()),
        }
    }
}

impl From<&str> for RegistrySource {
    fn from(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            RegistrySource::Url(location.to_string())
        } else {
            RegistrySource::Path(PathBuf::from(location))
        }
    }
}

impl From<String> for RegistrySource {
    fn from(location: String) -> Self {
        RegistrySource::from(location.as_str())
    }
}

impl From<PathBuf> for RegistrySource {
    fn from(path: PathBuf) -> Self {
        RegistrySource::Path(path)
    }
}

impl fmt::Display for RegistrySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrySource::Url(url) => write!(f, "{url}"),
            RegistrySource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Loads the monitoring-station list. Any failure is returned to the caller; there is no
/// retry and no fallback registry.
pub struct StationRegistryLoader {
    client: Client,
    sheet: String,
}

impl StationRegistryLoader {
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            sheet: sheet.into(),
        }
    }

    pub async fn load(&self, source: &RegistrySource) -> Result<Vec<Station>, RegistryError> {
        let bytes = match source {
            RegistrySource::Url(url) => self.download(url).await?,
            RegistrySource::Path(path) => {
                info!("Reading station registry from {}", path.display());
                tokio::fs::read(path)
                    .await
                    .map_err(|e| RegistryError::FileRead(path.clone(), e))?
            }
        };

        let format = source.format();
        let sheet_name = self.sheet.clone();
        let sheet = task::spawn_blocking(move || match format {
            RegistryFormat::Workbook => RawSheet::from_workbook(bytes, &sheet_name),
            RegistryFormat::Delimited => RawSheet::from_delimited(&bytes),
        })
        .await??;

        let stations = stations_from_sheet(&sheet)?;
        info!("Loaded {} stations from {}", stations.len(), source);
        Ok(stations)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, RegistryError> {
        info!("Downloading station registry from {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RegistryError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    RegistryError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    RegistryError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RegistryError::NetworkRequest(url.to_string(), e))?;
        Ok(bytes.to_vec())
    }
}

/// Interprets a raw registry table: remaps the header, keeps the four station fields,
/// drops rows without a code or with invalid coordinates, and keeps the first row of each
/// station code.
pub fn stations_from_sheet(sheet: &RawSheet) -> Result<Vec<Station>, RegistryError> {
    let header = sheet
        .header()
        .ok_or(RegistryError::MissingHeaderRow(HEADER_ROW_OFFSET))?;
    let columns = StationColumns::locate(&header)
        .map_err(|missing| RegistryError::MissingColumn(missing.to_string()))?;

    let mut seen = HashSet::new();
    let mut stations = Vec::new();
    let mut dropped = 0usize;

    for row in sheet.data_rows() {
        let cell = |idx: usize| row.get(idx);
        let code = cell(columns.station_code).and_then(|c| c.as_text());
        let latitude = cell(columns.latitude).and_then(|c| c.as_f64());
        let longitude = cell(columns.longitude).and_then(|c| c.as_f64());

        let (Some(code), Some(latitude), Some(longitude)) = (code, latitude, longitude) else {
            dropped += 1;
            continue;
        };
        if !Station::has_valid_coordinates(latitude, longitude) {
            debug!(
                "Dropping station {} with coordinates ({}, {})",
                code, latitude, longitude
            );
            dropped += 1;
            continue;
        }
        if !seen.insert(code.clone()) {
            continue;
        }

        stations.push(Station {
            station_name: cell(columns.station_name)
                .and_then(|c| c.as_text())
                .unwrap_or_default(),
            station_code: code,
            latitude,
            longitude,
        });
    }

    if dropped > 0 {
        info!(
            "Dropped {} registry rows without a code or with invalid coordinates",
            dropped
        );
    }
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stations::sheet::Cell;
    use rust_xlsxwriter::{Workbook, XlsxError};

    fn text(value: &str) -> Cell {
        Cell::from(value)
    }

    /// Builds a sheet with the published (mislabelled) header layout. Each entry is
    /// `(code, name, true latitude, true longitude)`.
    fn published_sheet(rows: &[(&str, &str, f64, f64)]) -> RawSheet {
        let mut sheet = vec![
            vec![text("Liste points de mesures 2020")],
            vec![text("Source: LCSQA")],
            vec![
                text("Code station"),
                text("Nom station"),
                text("Latitude"),
                text("Longitude"),
                text("NO2"),
                text("PM10"),
            ],
        ];
        for (code, name, lat, lon) in rows {
            sheet.push(vec![
                text(code),
                text(name),
                text("x"),
                Cell::Number(*lat),
                Cell::Number(*lon),
                text("oui"),
            ]);
        }
        RawSheet::new(sheet)
    }

    #[test]
    fn test_station_with_negative_latitude_is_dropped() -> Result<(), RegistryError> {
        let sheet = published_sheet(&[("A", "Paris", 48.8, 2.3), ("B", "Nowhere", -1.0, 2.0)]);
        let stations = stations_from_sheet(&sheet)?;
        assert_eq!(
            stations,
            vec![Station {
                station_code: "A".to_string(),
                station_name: "Paris".to_string(),
                latitude: 48.8,
                longitude: 2.3,
            }]
        );
        Ok(())
    }

    #[test]
    fn test_boundary_coordinates_are_excluded() -> Result<(), RegistryError> {
        let sheet = published_sheet(&[
            ("ZERO_LAT", "a", 0.0, 2.0),
            ("WEST_EDGE", "b", 45.0, -6.0),
            ("JUST_IN", "c", 0.0001, -5.9999),
        ]);
        let stations = stations_from_sheet(&sheet)?;
        let codes: Vec<&str> = stations.iter().map(|s| s.station_code.as_str()).collect();
        assert_eq!(codes, vec!["JUST_IN"]);
        for station in &stations {
            assert!(station.latitude > 0.0 && station.longitude > -6.0);
        }
        Ok(())
    }

    #[test]
    fn test_duplicate_codes_keep_first_row() -> Result<(), RegistryError> {
        let sheet = published_sheet(&[
            ("FR20047", "Lyon Périphérique", 45.76, 4.85),
            ("FR20047", "Lyon Périphérique (PM)", 45.77, 4.86),
        ]);
        let stations = stations_from_sheet(&sheet)?;
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station_name, "Lyon Périphérique");
        Ok(())
    }

    #[test]
    fn test_rows_without_coordinates_or_code_are_dropped() -> Result<(), RegistryError> {
        let mut sheet = published_sheet(&[("A", "Paris", 48.8, 2.3)]);
        sheet.rows.push(vec![text("C"), text("No coords"), text("x")]);
        sheet
            .rows
            .push(vec![Cell::Empty, text("No code"), text("x"), Cell::Number(45.0), Cell::Number(3.0)]);
        let stations = stations_from_sheet(&sheet)?;
        assert_eq!(stations.len(), 1);
        Ok(())
    }

    #[test]
    fn test_missing_header_row_is_fatal() {
        let sheet = RawSheet::new(vec![vec![text("meta")]]);
        assert!(matches!(
            stations_from_sheet(&sheet),
            Err(RegistryError::MissingHeaderRow(2))
        ));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let sheet = RawSheet::new(vec![
            vec![text("meta")],
            vec![text("meta")],
            vec![text("Code station"), text("Nom station")],
        ]);
        assert!(matches!(
            stations_from_sheet(&sheet),
            Err(RegistryError::MissingColumn(column)) if column == "latitude"
        ));
    }

    #[test]
    fn test_source_from_location() {
        assert_eq!(
            RegistrySource::from("https://example.org/list.xlsx"),
            RegistrySource::Url("https://example.org/list.xlsx".to_string())
        );
        assert_eq!(
            RegistrySource::from("./list.xlsx"),
            RegistrySource::Path(PathBuf::from("./list.xlsx"))
        );
    }

    #[tokio::test]
    async fn test_load_delimited_registry_from_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("points.csv");
        tokio::fs::write(
            &path,
            "Liste points de mesures;;;;\n\
             ;;;;\n\
             Code station;Nom station;Latitude;Longitude;NO2\n\
             FR20047;Lyon Périphérique;x;45,76;4,85\n\
             FR99999;Outre-mer;x;-21,1;55,5\n",
        )
        .await?;

        let loader = StationRegistryLoader::new(DEFAULT_REGISTRY_SHEET);
        let stations = loader.load(&RegistrySource::Path(path)).await?;
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station_code, "FR20047");
        assert_eq!(stations[0].latitude, 45.76);
        assert_eq!(stations[0].longitude, 4.85);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreadable_registry_is_fatal() {
        let loader = StationRegistryLoader::new(DEFAULT_REGISTRY_SHEET);
        let result = loader
            .load(&RegistrySource::Path(PathBuf::from("/nonexistent/points.xlsx")))
            .await;
        assert!(matches!(result, Err(RegistryError::FileRead(_, _))));
    }

    /// Writes a workbook whose `sheet` follows the published layout: the header sits on
    /// the third row and the first `title_rows` rows above it carry text.
    fn published_workbook(sheet: &str, title_rows: u32) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet)?;
        for row in 0..title_rows {
            worksheet.write_string(row, 0, "Liste des points de mesure")?;
        }
        let header = ["Code station", "Nom station", "Latitude", "Longitude", "NO2", "PM10"];
        for (col, label) in header.iter().enumerate() {
            worksheet.write_string(2, col as u16, *label)?;
        }
        let rows = [
            ("FR20047", "Lyon Périphérique", 45.76, 4.85),
            ("FR04143", "Paris 18ème", 48.89, 2.35),
            ("FR20047", "Lyon Périphérique (doublon)", 45.0, 4.0),
            ("FR97001", "Outre-mer", -21.1, 55.5),
        ];
        for (offset, (code, name, latitude, longitude)) in rows.iter().enumerate() {
            let row = 3 + offset as u32;
            worksheet.write_string(row, 0, *code)?;
            worksheet.write_string(row, 1, *name)?;
            worksheet.write_string(row, 2, "x")?;
            worksheet.write_number(row, 3, *latitude)?;
            worksheet.write_number(row, 4, *longitude)?;
            worksheet.write_string(row, 5, "oui")?;
        }
        workbook.save_to_buffer()
    }

    async fn load_workbook(
        bytes: Vec<u8>,
        sheet: &str,
    ) -> Result<Result<Vec<Station>, RegistryError>, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("points.xlsx");
        tokio::fs::write(&path, bytes).await?;
        let loader = StationRegistryLoader::new(sheet);
        Ok(loader.load(&RegistrySource::Path(path)).await)
    }

    #[tokio::test]
    async fn test_load_published_workbook() -> Result<(), Box<dyn std::error::Error>> {
        let stations =
            load_workbook(published_workbook(DEFAULT_REGISTRY_SHEET, 2)?, DEFAULT_REGISTRY_SHEET)
                .await??;
        assert_eq!(
            stations,
            vec![
                Station {
                    station_code: "FR20047".to_string(),
                    station_name: "Lyon Périphérique".to_string(),
                    latitude: 45.76,
                    longitude: 4.85,
                },
                Station {
                    station_code: "FR04143".to_string(),
                    station_name: "Paris 18ème".to_string(),
                    latitude: 48.89,
                    longitude: 2.35,
                },
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_workbook_with_blank_rows_above_header() -> Result<(), Box<dyn std::error::Error>>
    {
        // Nothing above the header: the used range starts on the third row.
        let stations =
            load_workbook(published_workbook(DEFAULT_REGISTRY_SHEET, 0)?, DEFAULT_REGISTRY_SHEET)
                .await??;
        let codes: Vec<&str> = stations.iter().map(|s| s.station_code.as_str()).collect();
        assert_eq!(codes, vec!["FR20047", "FR04143"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_workbook_without_registry_sheet() -> Result<(), Box<dyn std::error::Error>> {
        let result = load_workbook(published_workbook("Feuil1", 2)?, DEFAULT_REGISTRY_SHEET).await?;
        match result {
            Err(RegistryError::MissingSheet { sheet, available }) => {
                assert_eq!(sheet, DEFAULT_REGISTRY_SHEET);
                assert_eq!(available, vec!["Feuil1".to_string()]);
            }
            other => panic!("expected a missing sheet error, got {other:?}"),
        }
        Ok(())
    }
}
