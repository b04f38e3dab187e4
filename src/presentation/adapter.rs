use crate::aggregate::{
    mean_by_station, mean_by_station_for_pollutant, series_for_sites_and_pollutant, SeriesPoint,
};
use crate::dashboard::Dashboard;
use crate::presentation::join::join_stations;
use crate::presentation::palette::series_color;
use crate::presentation::session::{FilterChanged, SelectionChanged, SessionState};
use crate::presentation::view::{MapView, SelectionView, SeriesGroup, StationSeries, TimePoint};
use log::debug;
use polars::prelude::PolarsResult;

/// Turns user events into presentation structures for a loaded [`Dashboard`].
///
/// Obtained through [`Dashboard::presenter`]; it borrows the loaded data and holds no
/// state of its own.
pub struct Presenter<'a> {
    dashboard: &'a Dashboard,
}

impl<'a> Presenter<'a> {
    pub(crate) fn new(dashboard: &'a Dashboard) -> Self {
        Self { dashboard }
    }

    /// Stations joined with their mean concentration, over every pollutant or only
    /// `pollutant`.
    pub fn map_view(&self, pollutant: Option<&str>) -> PolarsResult<MapView> {
        let measurements = self.dashboard.measurements();
        let means = match pollutant {
            Some(pollutant) => mean_by_station_for_pollutant(measurements, pollutant)?,
            None => mean_by_station(measurements)?,
        };
        let points = join_stations(self.dashboard.stations(), &means)?;
        Ok(MapView::new(pollutant, points))
    }

    /// Keeps the requested pollutants that occur in the data, in their source order.
    pub fn on_filter_changed(&self, _state: SessionState, event: FilterChanged) -> SessionState {
        let recognized = self
            .dashboard
            .pollutants()
            .iter()
            .filter(|known| event.pollutants.iter().any(|p| p == *known))
            .cloned()
            .collect();
        SessionState::with_pollutant_filter(recognized)
    }

    /// Builds one chart group per displayed pollutant that has readings for the selection.
    ///
    /// An empty selection yields a prompt. A selection for which no displayed pollutant
    /// has readings yields a "no data" notice naming the selected stations; when only some
    /// of them lack readings, the charts carry a notice naming those.
    pub fn on_selection_changed(
        &self,
        state: SessionState,
        event: SelectionChanged,
    ) -> PolarsResult<(SessionState, SelectionView)> {
        let state = match event.pollutants {
            Some(pollutants) => self.on_filter_changed(state, FilterChanged { pollutants }),
            None => state,
        };

        let mut selected: Vec<String> = Vec::with_capacity(event.selected.len());
        for name in event.selected {
            if !selected.contains(&name) {
                selected.push(name);
            }
        }
        if selected.is_empty() {
            return Ok((state, SelectionView::prompt()));
        }

        let mut groups = Vec::new();
        for (palette_index, pollutant) in self.dashboard.pollutants().iter().enumerate() {
            if !state.displays(pollutant) {
                continue;
            }
            let points =
                series_for_sites_and_pollutant(self.dashboard.measurements(), &selected, pollutant)?;
            if points.is_empty() {
                continue;
            }
            groups.push(series_group(pollutant, palette_index, &selected, points));
        }

        debug!(
            "Selection of {} stations produced {} chart groups",
            selected.len(),
            groups.len()
        );
        let view = if groups.is_empty() {
            SelectionView::no_data(selected)
        } else {
            let missing = selected
                .into_iter()
                .filter(|name| {
                    !groups
                        .iter()
                        .any(|g| g.series.iter().any(|s| s.station_name == *name))
                })
                .collect();
            SelectionView::charts(groups, missing)
        };
        Ok((state, view))
    }
}

/// Splits chronological points into one series per station, in selection order.
fn series_group(
    pollutant: &str,
    palette_index: usize,
    selected: &[String],
    points: Vec<SeriesPoint>,
) -> SeriesGroup {
    let mut per_station: Vec<Vec<TimePoint>> = vec![Vec::new(); selected.len()];
    for point in points {
        if let Some(slot) = selected.iter().position(|name| *name == point.station_name) {
            per_station[slot].push(TimePoint {
                time: point.time,
                value: point.value,
            });
        }
    }

    let series = selected
        .iter()
        .zip(per_station)
        .filter(|(_, points)| !points.is_empty())
        .enumerate()
        .map(|(series_index, (name, points))| StationSeries {
            station_name: name.clone(),
            color: series_color(palette_index, series_index).to_string(),
            points,
        })
        .collect();

    SeriesGroup {
        pollutant: pollutant.to_string(),
        palette_index,
        series,
    }
}
