pub mod adapter;
pub mod join;
pub mod palette;
pub mod session;
pub mod view;
