pub mod date_range;
pub mod measurement;
pub mod station;
