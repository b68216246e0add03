//! Pipeline control surface
//!
//! **Module Structure:**
//! - `controller/`: PipelineController, the state machine over an engine adapter
//! - `slots.rs`: Current/next slot bookkeeping
//! - `postpone.rs`: Coalescing store for requests made mid-transition
//!
//! Every operation on [`Pipeline`] is synchronous and returns immediately.
//! Requests that cannot be honored during a transition are recorded and
//! applied once the pipeline settles; they are still reported as accepted.

pub mod controller;
pub mod postpone;
pub mod slots;

pub use controller::PipelineController;
pub use postpone::{Intent, PostponedIntents};
pub use slots::{NextUpdate, Slot, Slots};

use crate::error::Result;
use crate::media::Media;
use playctl_common::{PipelineEvent, PipelineState, PositionUnit, Token, VolumeFormat};
use tokio::sync::broadcast;

/// Playback control capability
pub trait Pipeline: Send + Sync {
    /// Play `media` now, or schedule it to follow the current item
    ///
    /// - `play_now`, no current item, or `token` equal to the current
    ///   token: replace current (discarding next)
    /// - otherwise, next empty or holding another token: schedule as next
    /// - otherwise: replace next's media, keeping its token
    ///
    /// Fails with `Error::InvalidMedia` for structurally invalid
    /// descriptors and `Error::Rejected` when the engine refuses to start.
    fn play_media(&self, token: Token, media: Media, play_now: bool) -> Result<()>;

    fn stop(&self);

    fn get_new_token(&self) -> Token;

    fn set_paused(&self, paused: bool);

    fn is_paused(&self) -> bool {
        self.get_current_state() == PipelineState::Paused
    }

    fn is_transitioning(&self) -> bool {
        self.get_current_state().is_transitioning()
    }

    fn get_current_state(&self) -> PipelineState;

    /// Seek; ignored when idle, stopping, or the media is known unseekable
    fn set_current_position(&self, position: u64, unit: PositionUnit);

    /// `None` when the position cannot be resolved in `unit`
    fn get_current_position(&self, unit: PositionUnit) -> Option<u64>;

    /// `None` when the duration cannot be resolved in `unit`
    fn get_duration(&self, unit: PositionUnit) -> Option<u64>;

    fn set_volume(&self, volume: f64, format: VolumeFormat);

    fn get_volume(&self, format: VolumeFormat) -> f64;

    fn set_muted(&self, muted: bool);

    fn is_muted(&self) -> bool;

    fn current_media(&self) -> Option<Slot>;

    fn next_media(&self) -> Option<Slot>;

    fn subscribe(&self) -> broadcast::Receiver<PipelineEvent>;
}
