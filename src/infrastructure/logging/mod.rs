//! Logging infrastructure: structured `tracing` output, stdout and
//! optionally a rotated file, configured from [`LogConfig`].

pub mod config;
pub mod logger;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
