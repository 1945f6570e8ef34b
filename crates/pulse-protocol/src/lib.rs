//! Shared wire types for the Pulse health probe endpoints.

pub mod database;
pub mod reports;
pub mod timestamp;

pub use database::*;
pub use reports::*;
