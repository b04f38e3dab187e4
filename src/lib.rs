pub mod aggregate;
mod config;
mod dashboard;
mod error;
pub mod measurements;
pub mod presentation;
pub mod server;
pub mod stations;
mod types;
mod utils;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, DashboardConfig};
pub use dashboard::Dashboard;
pub use error::DashboardError;

pub use types::date_range::DateRange;
pub use types::measurement::{Measurement, MeasurementFrame};
pub use types::station::*;

pub use measurements::error::MeasurementError;
pub use stations::error::RegistryError;
