//! Locations

pub mod data;
pub mod errors;
mod names;
pub mod records;
mod repository;
pub mod service;

pub use errors::LocationsServiceError;
pub use names::normalize_name;
pub use service::*;
