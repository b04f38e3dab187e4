use crate::aggregate::{StationMeans, MEAN_VALUE};
use crate::presentation::view::MapPoint;
use crate::stations::header::{LATITUDE, LONGITUDE, STATION_NAME};
use crate::types::measurement::{get_opt_float, get_opt_str, STATION_CODE};
use crate::types::station::Station;
use polars::prelude::*;

/// Position of a station in the registry; the join does not preserve row order.
const REGISTRY_ROW: &str = "registry_row";

/// Inner join of the registry with per-station means on `station_code`.
///
/// Stations without a mean (no readings, or only null readings) and means without a
/// registered station are both left out. Points keep registry order.
pub fn join_stations(stations: &[Station], means: &StationMeans) -> PolarsResult<Vec<MapPoint>> {
    let registry = df!(
        STATION_CODE => stations.iter().map(|s| s.station_code.as_str()).collect::<Vec<_>>(),
        STATION_NAME => stations.iter().map(|s| s.station_name.as_str()).collect::<Vec<_>>(),
        LATITUDE => stations.iter().map(|s| s.latitude).collect::<Vec<_>>(),
        LONGITUDE => stations.iter().map(|s| s.longitude).collect::<Vec<_>>(),
    )?;
    let aggregates = df!(
        STATION_CODE => means.keys().map(String::as_str).collect::<Vec<_>>(),
        MEAN_VALUE => means.values().copied().collect::<Vec<Option<f64>>>(),
    )?;

    let joined = registry
        .lazy()
        .with_row_index(REGISTRY_ROW, None)
        .inner_join(aggregates.lazy(), col(STATION_CODE), col(STATION_CODE))
        .filter(col(MEAN_VALUE).is_not_null())
        .sort_by_exprs(vec![col(REGISTRY_ROW)], SortMultipleOptions::default())
        .collect()?;

    let codes = joined.column(STATION_CODE)?;
    let names = joined.column(STATION_NAME)?;
    let latitudes = joined.column(LATITUDE)?;
    let longitudes = joined.column(LONGITUDE)?;
    let mean_values = joined.column(MEAN_VALUE)?;
    Ok((0..joined.height())
        .filter_map(|idx| {
            Some(MapPoint {
                station_code: get_opt_str(codes, idx)?.to_string(),
                station_name: get_opt_str(names, idx)?.to_string(),
                latitude: get_opt_float(latitudes, idx)?,
                longitude: get_opt_float(longitudes, idx)?,
                mean_value: get_opt_float(mean_values, idx)?,
            })
        })
        .collect())
}
