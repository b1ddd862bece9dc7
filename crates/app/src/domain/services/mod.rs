//! Service Lifecycle

pub mod aging;
pub mod data;
pub mod errors;
pub mod lifecycle;
pub mod records;
mod repository;
pub mod rut;
pub mod service;

pub use errors::ServiceLifecycleError;
pub use service::*;
