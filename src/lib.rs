//! apodsaver library
//!
//! NASA's Astronomy Picture of the Day as a terminal screensaver. The modules
//! are exposed for the binary and for integration tests.

pub mod app;
pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;
pub mod refresh;
pub mod ui;

#[cfg(test)]
mod testing;
