//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and handed to the
//! pipeline by value.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::AppPaths;
use crate::audio::SessionCategory;

/// Longest accepted tick period.
pub const MAX_TICK_INTERVAL_MS: u64 = 1_000;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A setting that would leave the pipeline in an invalid state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("analysis.buffer_capacity must be > 0")]
    ZeroBufferCapacity,

    #[error("analysis.tick_interval_ms must be > 0")]
    ZeroTickInterval,

    #[error("analysis.tick_interval_ms must be at most {MAX_TICK_INTERVAL_MS} (got {0})")]
    TickIntervalTooLong(u64),

    #[error("audio.buffer_frames must be > 0 when set")]
    ZeroBufferFrames,

    #[error("chain.{field} must be a positive finite frequency (got {value})")]
    InvalidFrequency { field: &'static str, value: f32 },

    #[error(
        "chain.high_pass_cutoff_hz ({high_pass}) must be below chain.low_pass_cutoff_hz ({low_pass})"
    )]
    InvertedBand { high_pass: f32, low_pass: f32 },

    #[error("chain.{field} must be a non-negative finite gain (got {value})")]
    InvalidGain { field: &'static str, value: f32 },
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Smoothing window and sampling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of amplitude readings averaged per callback.  Smaller windows
    /// respond faster but jitter more.
    pub buffer_capacity: usize,
    /// Milliseconds between two scheduler ticks.
    pub tick_interval_ms: u64,
}

impl AnalysisConfig {
    /// Tick period as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 10,
            tick_interval_ms: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// ChainConfig
// ---------------------------------------------------------------------------

/// Per-stage parameters of the signal chain.
///
/// Everything except `boost_gain` is fixed once a chain has been built.
/// `boost_gain` is only the value the gain control is reset to on each start;
/// see [`crate::dsp::GainControl`] for runtime changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Pre-filter gain.  Drop to `1.0` while the host records video, since
    /// the platform already boosts the input by about the same amount then.
    pub boost_gain: f32,
    /// High-pass cutoff in Hz.  Low enough to keep kick drums.
    pub high_pass_cutoff_hz: f32,
    /// Low-pass cutoff in Hz.
    pub low_pass_cutoff_hz: f32,
    /// Quality factor shared by both band filters.
    pub filter_q: f32,
    /// Half-power point of the RMS followers inside the balancer.
    pub balance_half_power_hz: f32,
    /// Half-power point of the amplitude tracker.
    pub tracker_half_power_hz: f32,
    /// Gain applied before the processed signal leaves the chain.
    pub mute_gain: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            boost_gain: 5.0,
            high_pass_cutoff_hz: 55.0,
            low_pass_cutoff_hz: 255.0,
            filter_q: std::f32::consts::FRAC_1_SQRT_2,
            balance_half_power_hz: 10.0,
            tracker_half_power_hz: 10.0,
            mute_gain: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AudioConfig
// ---------------------------------------------------------------------------

/// Capture device and session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name. `None` selects the system default.
    pub input_device: Option<String>,
    /// Frames per capture callback.  The meter is published once per
    /// callback, so one buffer should be shorter than a tick.  `None` keeps
    /// the host default.  Clamped to the range the device reports.
    pub buffer_frames: Option<u32>,
    /// Session category negotiated before capture starts.
    pub session_category: SessionCategory,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: None,
            buffer_frames: Some(256),
            session_category: SessionCategory::Record,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use gen_audio::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Smoothing and cadence.
    pub analysis: AnalysisConfig,
    /// Signal chain stage parameters.
    pub chain: ChainConfig,
    /// Capture device / session.
    pub audio: AudioConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check every invariant the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.buffer_capacity == 0 {
            return Err(ConfigError::ZeroBufferCapacity);
        }
        match self.analysis.tick_interval_ms {
            0 => return Err(ConfigError::ZeroTickInterval),
            ms if ms > MAX_TICK_INTERVAL_MS => {
                return Err(ConfigError::TickIntervalTooLong(ms));
            }
            _ => {}
        }
        if self.audio.buffer_frames == Some(0) {
            return Err(ConfigError::ZeroBufferFrames);
        }

        let chain = &self.chain;
        for (field, value) in [
            ("high_pass_cutoff_hz", chain.high_pass_cutoff_hz),
            ("low_pass_cutoff_hz", chain.low_pass_cutoff_hz),
            ("filter_q", chain.filter_q),
            ("balance_half_power_hz", chain.balance_half_power_hz),
            ("tracker_half_power_hz", chain.tracker_half_power_hz),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidFrequency { field, value });
            }
        }
        if chain.high_pass_cutoff_hz >= chain.low_pass_cutoff_hz {
            return Err(ConfigError::InvertedBand {
                high_pass: chain.high_pass_cutoff_hz,
                low_pass: chain.low_pass_cutoff_hz,
            });
        }

        for (field, value) in [("boost_gain", chain.boost_gain), ("mute_gain", chain.mute_gain)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidGain { field, value });
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.analysis.buffer_capacity, 10);
        assert_eq!(cfg.analysis.tick_interval(), Duration::from_millis(10));
        assert_eq!(cfg.chain.boost_gain, 5.0);
        assert_eq!(cfg.chain.high_pass_cutoff_hz, 55.0);
        assert_eq!(cfg.chain.low_pass_cutoff_hz, 255.0);
        assert_eq!(cfg.chain.mute_gain, 0.0);
        assert!(cfg.audio.input_device.is_none());
        assert_eq!(cfg.audio.buffer_frames, Some(256));
        assert_eq!(cfg.audio.session_category, SessionCategory::Record);
        assert_eq!(cfg.validate(), Ok(()));
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.analysis.buffer_capacity, 10);
        assert_eq!(config.chain.boost_gain, 5.0);
    }

    /// Modified values must survive a save / load cycle.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("settings.toml");

        let mut cfg = AppConfig::default();
        cfg.analysis.buffer_capacity = 32;
        cfg.analysis.tick_interval_ms = 16;
        cfg.chain.boost_gain = 1.0;
        cfg.chain.low_pass_cutoff_hz = 400.0;
        cfg.audio.input_device = Some("USB Mic".into());
        cfg.audio.buffer_frames = Some(128);
        cfg.audio.session_category = SessionCategory::PlayAndRecord;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.analysis.buffer_capacity, 32);
        assert_eq!(loaded.analysis.tick_interval_ms, 16);
        assert_eq!(loaded.chain.boost_gain, 1.0);
        assert_eq!(loaded.chain.low_pass_cutoff_hz, 400.0);
        assert_eq!(loaded.audio.input_device.as_deref(), Some("USB Mic"));
        assert_eq!(loaded.audio.buffer_frames, Some(128));
        assert_eq!(loaded.audio.session_category, SessionCategory::PlayAndRecord);
    }

    /// A file that only overrides one field keeps the other defaults.
    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[chain]\nboost_gain = 2.5\n").expect("write");

        let loaded = AppConfig::load_from(&path).expect("load");
        assert_eq!(loaded.chain.boost_gain, 2.5);
        assert_eq!(loaded.chain.high_pass_cutoff_hz, 55.0);
        assert_eq!(loaded.analysis.buffer_capacity, 10);
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut cfg = AppConfig::default();
        cfg.analysis.buffer_capacity = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBufferCapacity));
    }

    #[test]
    fn zero_interval_rejected() {
        let mut cfg = AppConfig::default();
        cfg.analysis.tick_interval_ms = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[test]
    fn overlong_interval_rejected() {
        let mut cfg = AppConfig::default();
        cfg.analysis.tick_interval_ms = MAX_TICK_INTERVAL_MS;
        assert_eq!(cfg.validate(), Ok(()));

        cfg.analysis.tick_interval_ms = MAX_TICK_INTERVAL_MS + 1;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::TickIntervalTooLong(MAX_TICK_INTERVAL_MS + 1))
        );

        cfg.analysis.tick_interval_ms = u64::MAX;
        assert_eq!(cfg.validate(), Err(ConfigError::TickIntervalTooLong(u64::MAX)));
    }

    #[test]
    fn buffer_frames_validated() {
        let mut cfg = AppConfig::default();
        cfg.audio.buffer_frames = None;
        assert_eq!(cfg.validate(), Ok(()));

        cfg.audio.buffer_frames = Some(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroBufferFrames));
    }

    #[test]
    fn inverted_band_rejected() {
        let mut cfg = AppConfig::default();
        cfg.chain.high_pass_cutoff_hz = 300.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvertedBand { .. })
        ));
    }

    #[test]
    fn bad_frequency_and_gain_rejected() {
        let mut cfg = AppConfig::default();
        cfg.chain.tracker_half_power_hz = f32::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidFrequency { field: "tracker_half_power_hz", .. })
        ));

        let mut cfg = AppConfig::default();
        cfg.chain.boost_gain = -1.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidGain { field: "boost_gain", .. })
        ));
    }
}
