//! Engine adapter boundary
//!
//! The engine decodes, talks to the device, buffers and owns the clock.
//! The controller drives it through [`EngineAdapter`] and learns about
//! asynchronous progress only through [`EngineNotification`]s posted on the
//! notification channel, each stamped with the token of the media graph it
//! concerns.
//!
//! **Module Structure:**
//! - `notify.rs`: Notification types and the bounded channel
//! - `simulated.rs`: Virtual-clock engine used by the console and tests

mod notify;
pub mod simulated;

pub use notify::{
    notification_channel, EngineMessage, EngineNotification, NotificationReceiver,
    NotificationSender,
};
pub use simulated::SimulatedEngine;

use crate::error::EngineError;
use crate::media::Media;
use playctl_common::{PositionUnit, Token, VolumeFormat};
use serde::{Deserialize, Serialize};

/// Engine-side playback state as reported by `StateReached`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Stopped,
    Paused,
    Playing,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Stopped => write!(f, "stopped"),
            EngineState::Paused => write!(f, "paused"),
            EngineState::Playing => write!(f, "playing"),
        }
    }
}

/// Result type for synchronous engine calls
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Operations the controller performs on a streaming engine
///
/// All methods are called with the controller's critical section held and
/// must return promptly. Completion of long operations is reported later
/// through the notification channel. Implementations must never call back
/// into the controller.
pub trait EngineAdapter: Send + 'static {
    /// Build a playback graph for `media` and start it
    ///
    /// Replaces any existing graph (best-effort teardown of the previous
    /// media). Completion is reported with `StateReached(Playing)` or
    /// `StateReached(Paused)`. An `Err` means the media was refused outright.
    /// Notifications about the new graph must be stamped with `token`.
    fn build_and_start(&mut self, token: Token, media: &Media) -> EngineResult<()>;

    /// Hint that `media` will follow the current one, allowing preroll
    fn prepare_next(&mut self, _token: Token, _media: &Media) {}

    /// Tear the graph down; completion is `StateReached(Stopped)` stamped
    /// with the token of the graph torn down
    fn stop_now(&mut self);

    /// Pause or resume; a request made while the graph is still starting
    /// applies once it is up
    fn set_paused(&mut self, paused: bool);

    /// Start a seek; completion is `SeekDone`
    fn seek(&mut self, position: u64, unit: PositionUnit) -> EngineResult<()>;

    /// Current position, `None` when the unit cannot be resolved
    fn get_position(&self, unit: PositionUnit) -> Option<u64>;

    /// Current media duration, `None` when the unit cannot be resolved
    fn get_duration(&self, unit: PositionUnit) -> Option<u64>;

    fn supports_volume(&self) -> bool;

    fn set_volume(&mut self, volume: f64, format: VolumeFormat);

    fn get_volume(&self, format: VolumeFormat) -> f64;

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;
}
