//! Derived views over the measurement table.
//!
//! Every function here is pure: it reads a [`MeasurementFrame`] and returns a freshly
//! computed value without keeping any state between calls.

use crate::types::measurement::{
    get_opt_datetime, get_opt_float, get_opt_str, MeasurementFrame, POLLUTANT, STATION_CODE,
    STATION_NAME, START_TIME, VALUE,
};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Column holding the per-station mean in aggregated frames.
pub const MEAN_VALUE: &str = "mean_value";

/// Mean `value` per station code. `None` when every reading of the station is null.
pub type StationMeans = BTreeMap<String, Option<f64>>;

/// One point of a station's time series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: NaiveDateTime,
    pub value: Option<f64>,
    pub station_name: String,
}

/// Averages `value` per station across all pollutants and times.
pub fn mean_by_station(measurements: &MeasurementFrame) -> PolarsResult<StationMeans> {
    collect_means(measurements.lazy())
}

/// Averages `value` per station over the readings of a single pollutant.
pub fn mean_by_station_for_pollutant(
    measurements: &MeasurementFrame,
    pollutant: &str,
) -> PolarsResult<StationMeans> {
    collect_means(measurements.lazy().filter(col(POLLUTANT).eq(lit(pollutant))))
}

/// Readings of `pollutant` for the named stations, in chronological order. Readings that
/// share a start time keep their table order.
pub fn series_for_sites_and_pollutant<S: AsRef<str>>(
    measurements: &MeasurementFrame,
    station_names: &[S],
    pollutant: &str,
) -> PolarsResult<Vec<SeriesPoint>> {
    let Some(any_site) = station_names
        .iter()
        .map(|name| col(STATION_NAME).eq(lit(name.as_ref())))
        .reduce(|acc, site| acc.or(site))
    else {
        return Ok(Vec::new());
    };

    let df = measurements
        .lazy()
        .filter(col(POLLUTANT).eq(lit(pollutant)).and(any_site))
        .filter(col(START_TIME).is_not_null())
        .sort_by_exprs(
            vec![col(START_TIME)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .select([
            col(START_TIME).cast(DataType::Int64),
            col(VALUE),
            col(STATION_NAME),
        ])
        .collect()?;

    let times = df.column(START_TIME)?;
    let values = df.column(VALUE)?;
    let names = df.column(STATION_NAME)?;
    Ok((0..df.height())
        .filter_map(|idx| {
            Some(SeriesPoint {
                time: get_opt_datetime(times, idx)?,
                value: get_opt_float(values, idx),
                station_name: get_opt_str(names, idx).unwrap_or_default().to_string(),
            })
        })
        .collect())
}

/// Distinct pollutants in order of first appearance.
pub fn pollutants(measurements: &MeasurementFrame) -> PolarsResult<Vec<String>> {
    let df = measurements
        .lazy()
        .select([col(POLLUTANT).unique_stable()])
        .collect()?;
    Ok(df
        .column(POLLUTANT)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// Lazily groups by station code, keeping groups in order of first appearance.
fn mean_frame(measurements: LazyFrame) -> LazyFrame {
    measurements
        .filter(col(STATION_CODE).is_not_null())
        .group_by_stable([col(STATION_CODE)])
        .agg([col(VALUE).mean().alias(MEAN_VALUE)])
}

fn collect_means(measurements: LazyFrame) -> PolarsResult<StationMeans> {
    let df = mean_frame(measurements).collect()?;
    let codes = df.column(STATION_CODE)?;
    let means = df.column(MEAN_VALUE)?;
    Ok((0..df.height())
        .filter_map(|idx| {
            get_opt_str(codes, idx).map(|code| (code.to_string(), get_opt_float(means, idx)))
        })
        .collect())
}
