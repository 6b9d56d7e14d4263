//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the analysis
//! cadence, the signal chain and the capture device, `AppPaths` for the
//! platform config directory, and TOML persistence via `AppConfig::load` /
//! `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AnalysisConfig, AppConfig, AudioConfig, ChainConfig, ConfigError, MAX_TICK_INTERVAL_MS,
};
