//! Configuration for the playctl controller and console driver
//!
//! Loaded from `playctl.toml`:
//!
//! ```toml
//! [logging]
//! level = "debug"
//!
//! [controller]
//! start_paused = false
//! buffering_low_watermark = 20
//! fatal_error_kinds = ["resource", "internal"]
//!
//! [engine]
//! default_duration_ms = 30000
//! byte_rate = 176400
//! ```
//!
//! Every field has a built-in default, so any subset (or no file at all)
//! is a valid configuration. File location priority is handled by
//! `playctl_common::config`.

use crate::error::{Error, Result};
use playctl_common::config::{load_config, LoggingConfig};
use playctl_common::events::EngineErrorKind;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level TOML document
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlayctlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub engine: SimulatedEngineConfig,
}

impl PlayctlConfig {
    /// Resolve, load and validate the configuration
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let config: PlayctlConfig = load_config(cli_path)?;
        config.controller.validate()?;
        config.engine.validate()?;
        Ok(config)
    }
}

/// Pipeline controller settings (`[controller]` table)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Bounded capacity of the engine notification channel
    pub notification_capacity: usize,

    /// Per-subscriber buffer of the event bus
    pub event_capacity: usize,

    /// Settle in paused instead of playing once a start completes
    pub start_paused: bool,

    /// Buffering percent below which playback pauses to refill
    pub buffering_low_watermark: u8,

    /// Buffering percent at or above which playback resumes
    pub buffering_high_watermark: u8,

    /// Engine error kinds that tear the pipeline down to idle
    pub fatal_error_kinds: Vec<EngineErrorKind>,

    /// Interval between PositionUpdated events while playing
    pub position_update_interval_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            notification_capacity: 64,
            event_capacity: 100,
            start_paused: false,
            buffering_low_watermark: 20,
            buffering_high_watermark: 100,
            fatal_error_kinds: EngineErrorKind::ALL.to_vec(),
            position_update_interval_ms: 500,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.notification_capacity == 0 {
            return Err(Error::Config("notification_capacity must be at least 1".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        if self.buffering_high_watermark > 100 {
            return Err(Error::Config(format!(
                "buffering_high_watermark {} exceeds 100",
                self.buffering_high_watermark
            )));
        }
        if self.buffering_low_watermark > self.buffering_high_watermark {
            return Err(Error::Config(format!(
                "buffering_low_watermark {} is above buffering_high_watermark {}",
                self.buffering_low_watermark, self.buffering_high_watermark
            )));
        }
        if self.position_update_interval_ms == 0 {
            return Err(Error::Config("position_update_interval_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn is_fatal(&self, kind: EngineErrorKind) -> bool {
        self.fatal_error_kinds.contains(&kind)
    }

    pub fn position_update_interval(&self) -> Duration {
        Duration::from_millis(self.position_update_interval_ms)
    }
}

/// Simulated engine settings (`[engine]` table)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatedEngineConfig {
    /// Duration used when the media payload has no `duration_ms`
    pub default_duration_ms: u64,

    /// Virtual clock resolution
    pub tick_ms: u64,

    /// Remaining time at which AboutToEnd is reported
    pub about_to_end_ms: u64,

    /// Bytes per second of simulated media; `None` disables byte positions
    pub byte_rate: Option<u64>,

    pub supports_volume: bool,

    /// Time between build_and_start and reaching Playing (non-prerolled media)
    pub startup_delay_ms: u64,
}

impl Default for SimulatedEngineConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 30_000,
            tick_ms: 50,
            about_to_end_ms: 2_000,
            byte_rate: Some(176_400),
            supports_volume: true,
            startup_delay_ms: 100,
        }
    }
}

impl SimulatedEngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            return Err(Error::Config("engine tick_ms must be at least 1".to_string()));
        }
        if self.byte_rate == Some(0) {
            return Err(Error::Config("engine byte_rate must be positive when set".to_string()));
        }
        Ok(())
    }
}
