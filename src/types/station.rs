//! Defines the monitoring-station record produced by the registry loader, and the
//! coordinate sanity rule applied to it.

use serde::{Deserialize, Serialize};

/// Latitudes must be strictly greater than this value to be kept.
pub const MIN_LATITUDE: f64 = 0.0;
/// Longitudes must be strictly greater than this value to be kept.
pub const MIN_LONGITUDE: f64 = -6.0;

/// A fixed physical air-quality monitoring site.
///
/// Stations are identified by their upstream `station_code` (e.g. `"FR20047"`). The registry
/// loader only ever yields stations whose coordinates pass [`Station::has_valid_coordinates`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// The unique station code, shared with the measurement files' `code site` column.
    pub station_code: String,
    /// Human readable site name; used as the map point label.
    pub station_name: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

impl Station {
    /// Crude geographic sanity filter for the target region. Both bounds are exclusive.
    ///
    /// # Examples
    ///
    /// ```
    /// use airmap::Station;
    ///
    /// assert!(Station::has_valid_coordinates(48.8, 2.3));
    /// assert!(!Station::has_valid_coordinates(0.0, 2.3));
    /// assert!(!Station::has_valid_coordinates(45.0, -6.0));
    /// ```
    pub fn has_valid_coordinates(latitude: f64, longitude: f64) -> bool {
        latitude > MIN_LATITUDE && longitude > MIN_LONGITUDE
    }
}
