pub mod config;
pub mod disability;
pub mod error;
pub mod telemetry;
