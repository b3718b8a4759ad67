//! This crate is intended to contain code that is required to provide or
//! improve the observability of the exchange. That includes initialization
//! logic for logging.
pub mod config;
pub mod tracing;

pub use config::Config;
