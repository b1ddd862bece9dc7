//! Warranty service tracking: repair tickets, the locations holding them and
//! the audit trail of every move between locations.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

pub mod uuids;
