//! Core controller logic - requests, transitions, postponement
//!
//! Every method here runs inside the critical section.

use super::Inner;
use crate::engine::{EngineAdapter, EngineState};
use crate::error::{EngineError, Error, Result};
use crate::media::Media;
use crate::pipeline::postpone::Intent;
use crate::pipeline::slots::{NextUpdate, Slot};
use playctl_common::events::EngineErrorKind;
use playctl_common::{PipelineEvent, PipelineState, PositionUnit, Token, VolumeFormat};
use tracing::{debug, error, info, warn};

impl<E: EngineAdapter> Inner<E> {
    pub(super) fn emit(&self, event: PipelineEvent) {
        self.events.emit_lossy(event);
    }

    pub(super) fn set_state(&mut self, new_state: PipelineState) {
        let old_state = self.state;
        if old_state == new_state {
            return;
        }
        debug!("State change: {} -> {}", old_state, new_state);
        self.state = new_state;
        self.emit(PipelineEvent::StateChanged {
            old_state,
            new_state,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Enter a settled state and apply the postponed requests valid in it
    pub(super) fn settle(&mut self, new_state: PipelineState) {
        self.set_state(new_state);
        self.drain_postponed();
    }

    pub(super) fn drain_postponed(&mut self) {
        while !self.state.is_transitioning() {
            let Some(intent) = self.postponed.take_next() else {
                break;
            };
            debug!("Applying postponed {:?} in state {}", intent, self.state);
            self.apply_intent(intent);
        }
    }

    fn apply_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Stop => self.stop(),
            Intent::Play { token, media } => {
                if let Err(e) = self.play_media(token, media, true) {
                    warn!("Postponed play of token {} failed: {}", token, e);
                }
            }
            Intent::Pause(paused) => self.set_paused(paused),
            Intent::Seek { position, unit } => self.set_current_position(position, unit),
            Intent::Volume { volume, format } => self.set_volume(volume, format),
            Intent::Mute(muted) => self.set_muted(muted),
        }
    }

    /// Clear slots, cache and media properties, then settle in idle
    pub(super) fn enter_idle(&mut self) {
        self.slots.clear();
        self.forget_media_properties();
        self.awaited_engine_state = None;
        self.engine_token = None;
        self.reset_durations();
        self.settle(PipelineState::Idle);
    }

    pub(super) fn forget_media_properties(&mut self) {
        self.seekable = None;
        self.live = None;
    }

    pub(super) fn play_media(&mut self, token: Token, media: Media, play_now: bool) -> Result<()> {
        if let Err(e) = media.validate() {
            error!("Cannot play media: {}", e);
            return Err(e);
        }

        let immediate = play_now
            || self.slots.current().is_none()
            || self.slots.is_current_token(token);

        if immediate {
            if matches!(self.state, PipelineState::Starting | PipelineState::Stopping) {
                info!(
                    "Pipeline {} -> postponing play of {} (token {})",
                    self.state, media, token
                );
                self.postponed.postpone_play(token, media);
                return Ok(());
            }
            return self.start_now(token, media);
        }

        match self.slots.schedule_next(token, media) {
            NextUpdate::Scheduled => debug!("Scheduled next media with token {}", token),
            NextUpdate::Replaced => debug!("Replaced media of next token {}", token),
        }

        if self.state != PipelineState::Idle {
            if let Some(next) = self.slots.next() {
                self.engine.prepare_next(next.token, &next.media);
            }
        }
        Ok(())
    }

    /// Replace current with `media` and ask the engine to start it
    ///
    /// Cancels any seek or buffering cycle of the old current media.
    fn start_now(&mut self, token: Token, media: Media) -> Result<()> {
        if self.state.is_transitioning() {
            debug!("Abandoning {} for new media", self.state);
        }
        info!("Playing {} now with token {}", media, token);

        // A pending stop or seek referred to the media being replaced
        self.postponed.discard_stop_and_seek();
        self.forget_media_properties();
        self.reset_durations();

        match self.engine.build_and_start(token, &media) {
            Ok(()) => {
                let uri = media.uri().to_string();
                self.slots.start(Slot::new(token, media));
                self.engine_token = Some(token);
                self.awaited_engine_state = Some(EngineState::Playing);
                self.set_state(PipelineState::Starting);
                self.emit(PipelineEvent::MediaStarted {
                    token,
                    uri,
                    timestamp: chrono::Utc::now(),
                });
                Ok(())
            }
            Err(e) => {
                self.reject_start(token, &media, &e);
                Err(Error::Rejected(e))
            }
        }
    }

    /// Engine refused a media item: tear down and report
    pub(super) fn reject_start(&mut self, token: Token, media: &Media, err: &EngineError) {
        error!("Engine rejected {} (token {}): {}", media, token, err);
        self.abort_start(err.kind, format!("cannot play {}: {}", media, err.message));
    }

    /// Give up on a start that cannot complete
    ///
    /// Reported as a non-fatal error; requests postponed behind the start
    /// still apply once idle.
    pub(super) fn abort_start(&mut self, kind: EngineErrorKind, message: String) {
        self.engine.stop_now();
        self.emit(PipelineEvent::Error {
            kind,
            message,
            fatal: false,
            timestamp: chrono::Utc::now(),
        });
        self.enter_idle();
    }

    pub(super) fn stop(&mut self) {
        match self.state {
            PipelineState::Idle | PipelineState::Stopping => {
                debug!("Ignoring stop in state {}", self.state);
            }
            PipelineState::Starting | PipelineState::Seeking | PipelineState::Buffering => {
                info!("Pipeline {} -> postponing stop", self.state);
                self.slots.clear();
                self.postponed.postpone_stop();
            }
            PipelineState::Playing | PipelineState::Paused => self.begin_stop(),
        }
    }

    pub(super) fn begin_stop(&mut self) {
        info!("Stopping playback");
        self.slots.clear();
        self.awaited_engine_state = Some(EngineState::Stopped);
        self.set_state(PipelineState::Stopping);
        self.engine.stop_now();
    }

    pub(super) fn set_paused(&mut self, paused: bool) {
        match self.state {
            PipelineState::Idle | PipelineState::Stopping => {
                debug!("Ignoring set_paused({}) in state {}", paused, self.state);
            }
            PipelineState::Starting | PipelineState::Seeking | PipelineState::Buffering => {
                info!("Pipeline {} -> postponing set_paused({})", self.state, paused);
                self.postponed.postpone_pause(paused);
            }
            PipelineState::Playing if paused => {
                self.request_engine_pause(true);
                self.set_state(PipelineState::Paused);
            }
            PipelineState::Paused if !paused => {
                self.request_engine_pause(false);
                self.set_state(PipelineState::Playing);
            }
            PipelineState::Playing | PipelineState::Paused => {
                debug!("Already {}", self.state);
            }
        }
    }

    pub(super) fn request_engine_pause(&mut self, paused: bool) {
        self.awaited_engine_state = Some(if paused {
            EngineState::Paused
        } else {
            EngineState::Playing
        });
        self.engine.set_paused(paused);
    }

    pub(super) fn set_current_position(&mut self, position: u64, unit: PositionUnit) {
        match self.state {
            PipelineState::Idle | PipelineState::Stopping => {
                debug!("Ignoring seek in state {}", self.state);
            }
            PipelineState::Starting | PipelineState::Seeking | PipelineState::Buffering => {
                info!("Pipeline {} -> postponing seek to {} {}", self.state, position, unit);
                self.postponed.postpone_seek(position, unit);
            }
            PipelineState::Playing | PipelineState::Paused => {
                if self.seekable == Some(false) {
                    debug!("Ignoring seek: current media is not seekable");
                    return;
                }
                match self.engine.seek(position, unit) {
                    Ok(()) => {
                        debug!("Seeking to {} {}", position, unit);
                        self.resume_state = self.state;
                        self.set_state(PipelineState::Seeking);
                    }
                    Err(e) => {
                        warn!("Seek to {} {} failed: {}", position, unit, e);
                        self.emit(PipelineEvent::Warning {
                            message: format!("seek failed: {}", e),
                        });
                    }
                }
            }
        }
    }

    pub(super) fn set_volume(&mut self, volume: f64, format: VolumeFormat) {
        if !self.engine.supports_volume() {
            debug!("Engine has no volume control, ignoring set_volume");
            return;
        }
        if self.state.is_transitioning() {
            info!("Pipeline {} -> postponing set_volume", self.state);
            self.postponed.postpone_volume(volume, format);
            return;
        }
        self.engine.set_volume(volume, format);
    }

    pub(super) fn set_muted(&mut self, muted: bool) {
        if !self.engine.supports_volume() {
            debug!("Engine has no volume control, ignoring set_muted");
            return;
        }
        if self.state.is_transitioning() {
            info!("Pipeline {} -> postponing set_muted({})", self.state, muted);
            self.postponed.postpone_mute(muted);
            return;
        }
        self.engine.set_muted(muted);
    }

    /// Re-query durations, emitting DurationUpdated for changed units
    pub(super) fn refresh_durations(&mut self) {
        for unit in PositionUnit::ALL {
            let duration = self.engine.get_duration(unit);
            self.store_duration(unit, duration);
        }
    }

    fn reset_durations(&mut self) {
        for unit in PositionUnit::ALL {
            self.store_duration(unit, None);
        }
    }

    fn store_duration(&mut self, unit: PositionUnit, duration: Option<u64>) {
        if self.durations.update(unit, duration) {
            debug!("Duration in {} now {:?}", unit, duration);
            self.emit(PipelineEvent::DurationUpdated {
                token: self.engine_token,
                unit,
                duration,
            });
        }
    }
}
