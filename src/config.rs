use crate::measurements::loader::DEFAULT_MEASUREMENT_URL_TEMPLATE;
use crate::stations::registry::{RegistrySource, DEFAULT_REGISTRY_SHEET};
use crate::types::date_range::DateRange;
use bon::Builder;
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_REGISTRY: &str = "AIRMAP_REGISTRY";
pub const ENV_REGISTRY_SHEET: &str = "AIRMAP_REGISTRY_SHEET";
pub const ENV_URL_TEMPLATE: &str = "AIRMAP_URL_TEMPLATE";
pub const ENV_START: &str = "AIRMAP_START";
pub const ENV_END: &str = "AIRMAP_END";
pub const ENV_SNAPSHOT: &str = "AIRMAP_SNAPSHOT";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable {0} is required")]
    MissingVariable(&'static str),

    #[error("Environment variable {key} must be a YYYY-MM-DD date, got '{value}'")]
    InvalidDate {
        key: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Period ends ({end}) before it starts ({start})")]
    EmptyPeriod { start: NaiveDate, end: NaiveDate },
}

/// Everything [`crate::Dashboard::load`] needs to know.
///
/// # Examples
///
/// ```
/// use airmap::{DashboardConfig, DateRange};
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
/// let config = DashboardConfig::builder()
///     .registry_source("stations.xlsx")
///     .period(DateRange::single(day))
///     .build();
/// assert_eq!(config.registry_sheet, "Points de mesure");
/// assert!(config.snapshot_path.is_none());
/// ```
#[derive(Debug, Clone, Builder)]
pub struct DashboardConfig {
    /// Registry spreadsheet: an `http(s)` URL or a local path.
    #[builder(into)]
    pub registry_source: RegistrySource,
    #[builder(into, default = DEFAULT_REGISTRY_SHEET.to_string())]
    pub registry_sheet: String,
    /// chrono `strftime` pattern rendered once per day of `period`.
    #[builder(into, default = DEFAULT_MEASUREMENT_URL_TEMPLATE.to_string())]
    pub measurement_url_template: String,
    pub period: DateRange,
    /// Falls back to `<cache dir>/airmap/measurements.parquet`.
    #[builder(into)]
    pub snapshot_path: Option<PathBuf>,
}

impl DashboardConfig {
    /// The single day the published dashboard was built for.
    pub fn default_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 3).unwrap_or_default()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Same as [`DashboardConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let registry = lookup(ENV_REGISTRY).ok_or(ConfigError::MissingVariable(ENV_REGISTRY))?;
        let start = parse_date(&lookup, ENV_START)?.unwrap_or_else(Self::default_day);
        let end = parse_date(&lookup, ENV_END)?.unwrap_or(start);
        let period = DateRange::new(start, end).ok_or(ConfigError::EmptyPeriod { start, end })?;

        Ok(Self::builder()
            .registry_source(registry)
            .maybe_registry_sheet(lookup(ENV_REGISTRY_SHEET))
            .maybe_measurement_url_template(lookup(ENV_URL_TEMPLATE))
            .period(period)
            .maybe_snapshot_path(lookup(ENV_SNAPSHOT).map(PathBuf::from))
            .build())
    }
}

fn parse_date<F>(lookup: &F, key: &'static str) -> Result<Option<NaiveDate>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            NaiveDate::parse_from_str(&value, DATE_FORMAT)
                .map_err(|source| ConfigError::InvalidDate { key, value, source })
        })
        .transpose()
}
