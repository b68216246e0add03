//! Pipeline controller - the state machine over an engine adapter
//!
//! **Module Structure:**
//! - `core.rs`: Public requests, state transitions, postponement draining
//! - `notifications.rs`: Engine notification handling, background tasks
//! - `queries.rs`: Position, duration, volume and mute queries
//!
//! State, slots, postponed intents and the duration cache live in one
//! `Inner` behind a `std::sync::Mutex`. Public calls and engine
//! notifications are both serialized by that mutex, so no two transitions
//! are ever computed concurrently. Engine adapter methods are invoked with
//! the lock held and must not block.

mod core;
mod notifications;
mod queries;

use super::postpone::PostponedIntents;
use super::slots::{Slot, Slots};
use super::Pipeline;
use crate::config::ControllerConfig;
use crate::engine::{EngineAdapter, EngineState};
use crate::error::Result;
use crate::media::Media;
use crate::token::TokenGenerator;
use playctl_common::{EventBus, PipelineEvent, PipelineState, PositionUnit, Token, VolumeFormat};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Last known duration per unit
#[derive(Debug, Default)]
pub(super) struct DurationCache {
    nanoseconds: Option<u64>,
    bytes: Option<u64>,
}

impl DurationCache {
    pub(super) fn get(&self, unit: PositionUnit) -> Option<u64> {
        match unit {
            PositionUnit::Nanoseconds => self.nanoseconds,
            PositionUnit::Bytes => self.bytes,
        }
    }

    /// Store a value, returning true if it differs from the cached one
    pub(super) fn update(&mut self, unit: PositionUnit, value: Option<u64>) -> bool {
        let slot = match unit {
            PositionUnit::Nanoseconds => &mut self.nanoseconds,
            PositionUnit::Bytes => &mut self.bytes,
        };
        let changed = *slot != value;
        *slot = value;
        changed
    }
}

/// Everything guarded by the controller's critical section
pub(super) struct Inner<E> {
    pub(super) engine: E,
    pub(super) config: ControllerConfig,
    pub(super) events: EventBus,
    pub(super) state: PipelineState,
    /// Playing or Paused; where a seek or buffering cycle returns to
    pub(super) resume_state: PipelineState,
    /// Engine state the controller last asked for and has not seen yet
    pub(super) awaited_engine_state: Option<EngineState>,
    /// Token of the graph the engine was last asked to build
    ///
    /// Notifications stamped with any other token are left over from a
    /// replaced graph and are dropped.
    pub(super) engine_token: Option<Token>,
    pub(super) slots: Slots,
    pub(super) postponed: PostponedIntents,
    pub(super) durations: DurationCache,
    /// Last seekability report for the current media
    pub(super) seekable: Option<bool>,
    /// Last live-source report for the current media
    pub(super) live: Option<bool>,
}

/// Playback controller over an engine adapter
///
/// Cloning yields another handle to the same controller, so the
/// notification task and callers can share it.
///
/// # Examples
///
/// ```no_run
/// use playctl::config::{ControllerConfig, SimulatedEngineConfig};
/// use playctl::engine::{notification_channel, SimulatedEngine};
/// use playctl::media::Media;
/// use playctl::pipeline::{Pipeline, PipelineController};
///
/// # async fn demo() -> playctl::Result<()> {
/// let config = ControllerConfig::default();
/// let (tx, rx) = notification_channel(config.notification_capacity);
/// let engine = SimulatedEngine::spawn(SimulatedEngineConfig::default(), tx);
/// let controller = PipelineController::new(engine, config);
/// controller.spawn_notification_handler(rx);
///
/// let token = controller.get_new_token();
/// controller.play_media(token, Media::new("sim://track-1"), true)?;
/// # Ok(())
/// # }
/// ```
pub struct PipelineController<E: EngineAdapter> {
    inner: Arc<Mutex<Inner<E>>>,
    tokens: Arc<TokenGenerator>,
    events: EventBus,
}

impl<E: EngineAdapter> Clone for PipelineController<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            tokens: Arc::clone(&self.tokens),
            events: self.events.clone(),
        }
    }
}

impl<E: EngineAdapter> PipelineController<E> {
    pub fn new(engine: E, config: ControllerConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        let inner = Inner {
            engine,
            config,
            events: events.clone(),
            state: PipelineState::Idle,
            resume_state: PipelineState::Playing,
            awaited_engine_state: None,
            engine_token: None,
            slots: Slots::new(),
            postponed: PostponedIntents::new(),
            durations: DurationCache::default(),
            seekable: None,
            live: None,
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            tokens: Arc::new(TokenGenerator::new()),
            events,
        }
    }

    /// Lock the critical section, recovering from poisoning
    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// True if any request is waiting for the pipeline to settle
    pub fn has_pending_intents(&self) -> bool {
        !self.lock().postponed.is_empty()
    }

    /// Run `f` against the engine inside the critical section
    pub fn with_engine<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.lock().engine)
    }
}

impl<E: EngineAdapter> Pipeline for PipelineController<E> {
    fn play_media(&self, token: Token, media: Media, play_now: bool) -> Result<()> {
        self.lock().play_media(token, media, play_now)
    }

    fn stop(&self) {
        self.lock().stop();
    }

    fn get_new_token(&self) -> Token {
        self.tokens.next_token()
    }

    fn set_paused(&self, paused: bool) {
        self.lock().set_paused(paused);
    }

    fn get_current_state(&self) -> PipelineState {
        self.lock().state
    }

    fn set_current_position(&self, position: u64, unit: PositionUnit) {
        self.lock().set_current_position(position, unit);
    }

    fn get_current_position(&self, unit: PositionUnit) -> Option<u64> {
        self.lock().position(unit)
    }

    fn get_duration(&self, unit: PositionUnit) -> Option<u64> {
        self.lock().duration(unit)
    }

    fn set_volume(&self, volume: f64, format: VolumeFormat) {
        self.lock().set_volume(volume, format);
    }

    fn get_volume(&self, format: VolumeFormat) -> f64 {
        self.lock().volume(format)
    }

    fn set_muted(&self, muted: bool) {
        self.lock().set_muted(muted);
    }

    fn is_muted(&self) -> bool {
        self.lock().muted()
    }

    fn current_media(&self) -> Option<Slot> {
        self.lock().slots.current().cloned()
    }

    fn next_media(&self) -> Option<Slot> {
        self.lock().slots.next().cloned()
    }

    fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.events.subscribe()
    }
}
