//! The measurement table: canonical column names, the typed [`Measurement`] row and the
//! [`MeasurementFrame`] wrapper around the polars `DataFrame` that holds all loaded readings.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub const START_TIME: &str = "start_time";
pub const END_TIME: &str = "end_time";
pub const STATION_CODE: &str = "station_code";
pub const STATION_NAME: &str = "station_name";
pub const POLLUTANT: &str = "pollutant";
pub const VALUE: &str = "value";
pub const RAW_VALUE: &str = "raw_value";
pub const UNIT: &str = "unit";
pub const VALIDITY_FLAG: &str = "validity_flag";

/// Canonical column order of a [`MeasurementFrame`].
pub const MEASUREMENT_COLUMNS: [&str; 9] = [
    START_TIME,
    END_TIME,
    STATION_CODE,
    STATION_NAME,
    POLLUTANT,
    VALUE,
    RAW_VALUE,
    UNIT,
    VALIDITY_FLAG,
];

/// Timestamps are stored as naive wall-clock datetimes with millisecond precision.
pub(crate) fn timestamp_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

/// One sensor reading interval for one pollutant at one station.
///
/// Text columns that are null upstream materialise as empty strings; every other nullable
/// column stays an `Option`. The validity flag is carried through exactly as published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub station_code: String,
    pub station_name: String,
    pub pollutant: String,
    pub value: Option<f64>,
    pub raw_value: Option<f64>,
    pub unit: Option<String>,
    pub validity_flag: Option<i64>,
}

/// The full in-memory table of loaded measurements.
///
/// Holds an eager `DataFrame` with the [`MEASUREMENT_COLUMNS`] schema. The table is loaded
/// once and never mutated; every derived view is computed from [`MeasurementFrame::lazy`].
#[derive(Debug, Clone)]
pub struct MeasurementFrame {
    frame: DataFrame,
}

impl MeasurementFrame {
    /// Wraps a `DataFrame` that already uses the canonical column names.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// An empty table with the canonical schema.
    pub fn empty() -> PolarsResult<Self> {
        Self::from_records(&[])
    }

    /// Builds a table from typed rows, preserving their order.
    pub fn from_records(records: &[Measurement]) -> PolarsResult<Self> {
        let millis = |time: Option<NaiveDateTime>| time.map(|t| t.and_utc().timestamp_millis());

        let start: Vec<Option<i64>> = records.iter().map(|m| millis(m.start_time)).collect();
        let end: Vec<Option<i64>> = records.iter().map(|m| millis(m.end_time)).collect();
        let codes: Vec<&str> = records.iter().map(|m| m.station_code.as_str()).collect();
        let names: Vec<&str> = records.iter().map(|m| m.station_name.as_str()).collect();
        let pollutants: Vec<&str> = records.iter().map(|m| m.pollutant.as_str()).collect();
        let values: Vec<Option<f64>> = records.iter().map(|m| m.value).collect();
        let raw_values: Vec<Option<f64>> = records.iter().map(|m| m.raw_value).collect();
        let units: Vec<Option<&str>> = records.iter().map(|m| m.unit.as_deref()).collect();
        let flags: Vec<Option<i64>> = records.iter().map(|m| m.validity_flag).collect();

        let frame = DataFrame::new(vec![
            Column::new(START_TIME.into(), start).cast(&timestamp_dtype())?,
            Column::new(END_TIME.into(), end).cast(&timestamp_dtype())?,
            Column::new(STATION_CODE.into(), codes),
            Column::new(STATION_NAME.into(), names),
            Column::new(POLLUTANT.into(), pollutants),
            Column::new(VALUE.into(), values),
            Column::new(RAW_VALUE.into(), raw_values),
            Column::new(UNIT.into(), units),
            Column::new(VALIDITY_FLAG.into(), flags),
        ])?;
        Ok(Self { frame })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// A lazy view over the table. Cloning a `DataFrame` only clones its column handles.
    pub fn lazy(&self) -> LazyFrame {
        self.frame.clone().lazy()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Materialises every row as a typed [`Measurement`], in table order.
    pub fn records(&self) -> PolarsResult<Vec<Measurement>> {
        let df = &self.frame;
        let start = df.column(START_TIME)?.cast(&DataType::Int64)?;
        let end = df.column(END_TIME)?.cast(&DataType::Int64)?;
        let codes = df.column(STATION_CODE)?;
        let names = df.column(STATION_NAME)?;
        let pollutants = df.column(POLLUTANT)?;
        let values = df.column(VALUE)?;
        let raw_values = df.column(RAW_VALUE)?;
        let units = df.column(UNIT)?;
        let flags = df.column(VALIDITY_FLAG)?;

        Ok((0..df.height())
            .map(|idx| Measurement {
                start_time: get_opt_datetime(&start, idx),
                end_time: get_opt_datetime(&end, idx),
                station_code: get_opt_str(codes, idx).unwrap_or_default().to_string(),
                station_name: get_opt_str(names, idx).unwrap_or_default().to_string(),
                pollutant: get_opt_str(pollutants, idx).unwrap_or_default().to_string(),
                value: get_opt_float(values, idx),
                raw_value: get_opt_float(raw_values, idx),
                unit: get_opt_str(units, idx).map(str::to_string),
                validity_flag: get_opt_int(flags, idx),
            })
            .collect())
    }
}

pub(crate) fn get_opt_float(column: &Column, idx: usize) -> Option<f64> {
    column.f64().ok().and_then(|ca| ca.get(idx))
}

pub(crate) fn get_opt_int(column: &Column, idx: usize) -> Option<i64> {
    column.i64().ok().and_then(|ca| ca.get(idx))
}

pub(crate) fn get_opt_str(column: &Column, idx: usize) -> Option<&str> {
    column.str().ok().and_then(|ca| ca.get(idx))
}

/// Expects the physical (`Int64`, milliseconds) representation of a timestamp column.
pub(crate) fn get_opt_datetime(column: &Column, idx: usize) -> Option<NaiveDateTime> {
    get_opt_int(column, idx)
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.naive_utc())
}
