pub mod error;
pub mod header;
pub mod registry;
pub mod sheet;
