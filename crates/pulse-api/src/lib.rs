//! Pulse API — library crate for the health probe server.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `pulse-e2e-tests`) can reach `AppState`, `build_router`, and the
//! database checker implementations.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod shutdown;
pub mod state;
