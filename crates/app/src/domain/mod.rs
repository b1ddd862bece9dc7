//! Warranty Domain Concerns

pub mod errors;
pub mod locations;
pub mod owners;
pub mod pagination;
pub mod services;
pub mod transfers;
