pub mod error;
pub mod loader;
pub mod snapshot;
pub mod upstream;
