pub mod config;
pub mod deprivation;
pub mod error;
pub mod excuse;
pub mod export;
pub mod import;
pub mod models;
pub mod rates;
pub mod report;
pub mod seed;
pub mod store;

pub use error::{TrackerError, TrackerResult};
pub use store::AttendanceStore;
