//! Streaming log rotation filter.
//!
//! Copies a byte stream into a log file and rotates that file into numbered
//! backups (`app.log.1`, `app.log.2`, …) every time it reaches a line budget.
//! Lines can be prefixed with a local datetime and/or a monotonic timestamp.

pub mod config;
pub mod core;
pub mod driver;

pub use crate::config::{Config, InputSource};
pub use crate::core::{Error, Result, RunStats};
pub use crate::driver::{run, run_with};
