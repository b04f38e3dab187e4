//! The upstream station list is published with shifted coordinate headers: the column
//! labelled `Latitude` holds unrelated data, `Longitude` holds the latitude, and the
//! `NO2` column holds the longitude. [`HEADER_REMAP`] encodes that layout and is applied
//! to every registry regardless of its actual contents.

pub const STATION_CODE: &str = "station_code";
pub const STATION_NAME: &str = "station_name";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const UNUSED: &str = "unused";

/// Zero-based row of the header; two metadata rows precede it.
pub const HEADER_ROW_OFFSET: usize = 2;

/// Upstream label → canonical column name. Applied simultaneously, not in sequence.
pub const HEADER_REMAP: [(&str, &str); 5] = [
    ("Code station", STATION_CODE),
    ("Nom station", STATION_NAME),
    ("Latitude", UNUSED),
    ("Longitude", LATITUDE),
    ("NO2", LONGITUDE),
];

/// Canonical name for an upstream header label. Unknown labels are kept as-is (trimmed).
pub fn canonical_name(label: &str) -> &str {
    let label = label.trim();
    HEADER_REMAP
        .iter()
        .find(|(upstream, _)| *upstream == label)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(label)
}

/// Column positions of the four fields a [`crate::Station`] is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationColumns {
    pub station_code: usize,
    pub station_name: usize,
    pub latitude: usize,
    pub longitude: usize,
}

impl StationColumns {
    /// Locates the required columns after remapping, or returns the first missing name.
    pub fn locate<S: AsRef<str>>(header: &[S]) -> Result<Self, &'static str> {
        let find = |wanted: &'static str| {
            header
                .iter()
                .position(|label| canonical_name(label.as_ref()) == wanted)
                .ok_or(wanted)
        };
        Ok(Self {
            station_code: find(STATION_CODE)?,
            station_name: find(STATION_NAME)?,
            latitude: find(LATITUDE)?,
            longitude: find(LONGITUDE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Header of the "Points de mesure" sheet as published upstream.
    const PUBLISHED_HEADER: [&str; 9] = [
        "Code zone",
        "Code station",
        "Nom station",
        "Latitude",
        "Longitude",
        "NO2",
        "PM10",
        "PM2.5",
        "O3",
    ];

    #[test]
    fn test_published_layout_maps_shifted_coordinates() {
        let columns = StationColumns::locate(&PUBLISHED_HEADER).unwrap();
        assert_eq!(
            columns,
            StationColumns {
                station_code: 1,
                station_name: 2,
                latitude: 4,
                longitude: 5,
            }
        );
    }

    #[test]
    fn test_labelled_latitude_column_is_discarded() {
        assert_eq!(canonical_name("Latitude"), UNUSED);
        assert_eq!(canonical_name(" Longitude "), LATITUDE);
        assert_eq!(canonical_name("NO2"), LONGITUDE);
        assert_eq!(canonical_name("PM10"), "PM10");
    }

    #[test]
    fn test_missing_pollutant_column_means_no_longitude() {
        let header = ["Code station", "Nom station", "Latitude", "Longitude"];
        assert_eq!(StationColumns::locate(&header), Err(LONGITUDE));
    }
}
