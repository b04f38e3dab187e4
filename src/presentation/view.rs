//! Presentation-ready structures handed to the rendering layer. They carry data and
//! styling hints only; nothing here knows how to draw.

use chrono::NaiveDateTime;
use serde::Serialize;

pub const MAP_TITLE: &str = "Pollution";
pub const MAP_CENTER: LatLon = LatLon(46.5, 3.0);
pub const MAP_ZOOM: u8 = 5;
/// Low to high mean concentration.
pub const MAP_COLOR_SCALE: [&str; 3] = ["yellow", "orange", "red"];
pub const SELECTION_PROMPT: &str =
    "Select one or more stations on the map to display their measurements";

/// A geographical coordinate: latitude first, longitude second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon(pub f64, pub f64);

/// One row of the joined station/aggregate view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub station_code: String,
    /// Label of the point; selection events refer to stations by this name.
    pub station_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub mean_value: f64,
}

/// Stations coloured by mean concentration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub title: String,
    /// `None` when the means cover every pollutant.
    pub pollutant: Option<String>,
    pub center: LatLon,
    pub zoom: u8,
    pub color_scale: Vec<String>,
    pub points: Vec<MapPoint>,
}

impl MapView {
    pub fn new(pollutant: Option<&str>, points: Vec<MapPoint>) -> Self {
        Self {
            title: MAP_TITLE.to_string(),
            pollutant: pollutant.map(str::to_string),
            center: MAP_CENTER,
            zoom: MAP_ZOOM,
            color_scale: MAP_COLOR_SCALE.iter().map(|c| c.to_string()).collect(),
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub time: NaiveDateTime,
    pub value: Option<f64>,
}

/// The line of one station inside a pollutant group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSeries {
    pub station_name: String,
    pub color: String,
    pub points: Vec<TimePoint>,
}

/// All selected stations' series for one pollutant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesGroup {
    pub pollutant: String,
    /// Position of the pollutant in the source appearance order; selects the palette.
    pub palette_index: usize,
    pub series: Vec<StationSeries>,
}

/// Outcome of a selection event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionView {
    /// Nothing is selected.
    Prompt { message: String },
    /// Stations are selected but none of the displayed pollutants has readings for them.
    NoData {
        station_names: Vec<String>,
        message: String,
    },
    /// At least one selected station has readings. Selected stations without any are
    /// listed in `missing`, with a notice naming them.
    Charts {
        groups: Vec<SeriesGroup>,
        missing: Vec<String>,
        notice: Option<String>,
    },
}

impl SelectionView {
    pub fn prompt() -> Self {
        SelectionView::Prompt {
            message: SELECTION_PROMPT.to_string(),
        }
    }

    pub fn no_data(station_names: Vec<String>) -> Self {
        let message = no_data_message(&station_names);
        SelectionView::NoData {
            station_names,
            message,
        }
    }

    pub fn charts(groups: Vec<SeriesGroup>, missing: Vec<String>) -> Self {
        let notice = (!missing.is_empty()).then(|| no_data_message(&missing));
        SelectionView::Charts {
            groups,
            missing,
            notice,
        }
    }
}

fn no_data_message(station_names: &[String]) -> String {
    format!("No data for {}", station_names.join(", "))
}
