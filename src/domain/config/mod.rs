//! Configuration domain module

mod app_config;

pub use app_config::{AppConfig, DEFAULT_SAMPLE_RATE, SAMPLE_RATE_RANGE};
