//! Layout of the published per-day measurement files and their conversion to the
//! canonical [`MeasurementFrame`](crate::MeasurementFrame) schema.

use crate::types::measurement::{
    timestamp_dtype, END_TIME, POLLUTANT, RAW_VALUE, STATION_CODE, STATION_NAME, START_TIME,
    UNIT, VALIDITY_FLAG, VALUE,
};
use polars::prelude::*;
use std::io::Cursor;

pub const UPSTREAM_SEPARATOR: u8 = b';';
pub const UPSTREAM_DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Upstream column label → canonical column name. Every other upstream column is dropped.
pub const UPSTREAM_COLUMNS: [(&str, &str); 9] = [
    ("Date de début", START_TIME),
    ("Date de fin", END_TIME),
    ("code site", STATION_CODE),
    ("nom site", STATION_NAME),
    ("Polluant", POLLUTANT),
    ("valeur", VALUE),
    ("valeur brute", RAW_VALUE),
    ("unité de mesure", UNIT),
    ("validité", VALIDITY_FLAG),
];

fn upstream_label(canonical: &str) -> &'static str {
    UPSTREAM_COLUMNS
        .iter()
        .find(|(_, name)| *name == canonical)
        .map(|(label, _)| *label)
        .unwrap_or("")
}

/// Parses one day file. Every column is read as text and then cast explicitly, so the
/// resulting schema never depends on what a particular day happens to contain.
pub fn parse_daily_csv(bytes: Vec<u8>) -> PolarsResult<DataFrame> {
    let mut raw = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| {
            opts.with_separator(UPSTREAM_SEPARATOR)
                .with_encoding(CsvEncoding::LossyUtf8)
        })
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    let names: Vec<String> = raw
        .get_column_names()
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    raw.set_column_names(names)?;

    normalize(raw.lazy()).collect()
}

/// Selects and renames the upstream columns, parses timestamps and casts numbers.
/// Unparseable values become nulls; rows are never dropped here.
pub fn normalize(raw: LazyFrame) -> LazyFrame {
    let text = |canonical: &'static str| {
        col(upstream_label(canonical))
            .cast(DataType::String)
            .alias(canonical)
    };
    let timestamp = |canonical: &'static str| {
        col(upstream_label(canonical))
            .str()
            .to_datetime(
                Some(TimeUnit::Milliseconds),
                None,
                StrptimeOptions {
                    format: Some(UPSTREAM_DATETIME_FORMAT.into()),
                    strict: false,
                    ..Default::default()
                },
                lit("raise"),
            )
            .cast(timestamp_dtype())
            .alias(canonical)
    };
    let number = |canonical: &'static str, dtype: DataType| {
        col(upstream_label(canonical)).cast(dtype).alias(canonical)
    };

    raw.select([
        timestamp(START_TIME),
        timestamp(END_TIME),
        text(STATION_CODE),
        text(STATION_NAME),
        text(POLLUTANT),
        number(VALUE, DataType::Float64),
        number(RAW_VALUE, DataType::Float64),
        text(UNIT),
        number(VALIDITY_FLAG, DataType::Int64),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DAY_FILE;
    use crate::types::measurement::{MeasurementFrame, MEASUREMENT_COLUMNS};
    use chrono::NaiveDate;

    #[test]
    fn test_day_file_is_normalised() -> PolarsResult<()> {
        let df = parse_daily_csv(DAY_FILE.as_bytes().to_vec())?;
        let names: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, MEASUREMENT_COLUMNS.to_vec());
        assert_eq!(df.height(), 3);

        let records = MeasurementFrame::new(df).records()?;
        let first = &records[0];
        assert_eq!(
            first.start_time,
            NaiveDate::from_ymd_opt(2021, 1, 3).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(
            first.end_time,
            NaiveDate::from_ymd_opt(2021, 1, 3).unwrap().and_hms_opt(1, 0, 0)
        );
        assert_eq!(first.station_code, "FR20047");
        assert_eq!(first.station_name, "Lyon Périphérique");
        assert_eq!(first.pollutant, "PM10");
        assert_eq!(first.value, Some(10.0));
        assert_eq!(first.raw_value, Some(10.2));
        assert_eq!(first.unit.as_deref(), Some("µg-m3"));
        assert_eq!(first.validity_flag, Some(1));
        Ok(())
    }

    #[test]
    fn test_missing_values_stay_null() -> PolarsResult<()> {
        let df = parse_daily_csv(DAY_FILE.as_bytes().to_vec())?;
        let records = MeasurementFrame::new(df).records()?;
        let no2 = &records[2];
        assert_eq!(no2.pollutant, "NO2");
        assert_eq!(no2.value, None);
        assert_eq!(no2.raw_value, None);
        assert_eq!(no2.validity_flag, Some(-1));
        Ok(())
    }

    #[test]
    fn test_file_without_expected_columns_fails() {
        let result = parse_daily_csv(b"a;b\n1;2\n".to_vec());
        assert!(result.is_err());
    }
}
