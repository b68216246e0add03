//! Engine notification handling and background tasks

use super::{Inner, PipelineController};
use crate::engine::{
    EngineAdapter, EngineMessage, EngineNotification, EngineState, NotificationReceiver,
};
use crate::pipeline::slots::Slot;
use playctl_common::events::EngineErrorKind;
use playctl_common::{PipelineEvent, PipelineState, PositionUnit};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

impl<E: EngineAdapter> PipelineController<E> {
    /// Process one engine notification inside the critical section
    ///
    /// Accepts a stamped [`EngineMessage`] or a bare notification, which is
    /// treated as concerning whatever media is current.
    pub fn handle_notification(&self, message: impl Into<EngineMessage>) {
        self.lock().handle_notification(message.into());
    }

    /// Consume the notification channel on a tokio task
    ///
    /// Notifications are processed in delivery order. The task ends when
    /// every sender has been dropped.
    pub fn spawn_notification_handler(&self, mut rx: NotificationReceiver) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            info!("Engine notification handler started");
            while let Some(message) = rx.recv().await {
                controller.handle_notification(message);
            }
            debug!("Notification channel closed, handler exiting");
        })
    }

    /// Emit PositionUpdated every `period` while playing
    pub fn spawn_position_reporter(&self, period: Duration) -> JoinHandle<()> {
        let controller = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                controller.report_position();
            }
        })
    }

    /// Emit a single PositionUpdated event if playing
    pub fn report_position(&self) {
        let inner = self.lock();
        if inner.state != PipelineState::Playing {
            return;
        }
        inner.emit(PipelineEvent::PositionUpdated {
            token: inner.slots.current_token(),
            position_ns: inner.engine.get_position(PositionUnit::Nanoseconds),
            duration_ns: inner.durations.get(PositionUnit::Nanoseconds),
        });
    }
}

impl<E: EngineAdapter> Inner<E> {
    pub(super) fn handle_notification(&mut self, message: EngineMessage) {
        let EngineMessage {
            token,
            notification,
        } = message;
        trace!("Engine notification {:?} ({:?}) in state {}", notification, token, self.state);

        if let (Some(stamp), Some(current)) = (token, self.engine_token) {
            if stamp != current {
                debug!(
                    "Dropping {:?} from replaced media {} (engine now on {})",
                    notification, stamp, current
                );
                return;
            }
        }

        match notification {
            EngineNotification::StateReached(reached) => self.on_state_reached(reached),
            EngineNotification::EndOfStream => self.on_end_of_stream(),
            EngineNotification::BufferingProgress(percent) => self.on_buffering(percent),
            EngineNotification::DurationChanged => {
                if self.state != PipelineState::Idle {
                    self.refresh_durations();
                }
            }
            EngineNotification::SeekDone => self.on_seek_done(),
            EngineNotification::Error { kind, message } => self.on_engine_error(kind, message),
            EngineNotification::AboutToEnd => {
                if let Some(token) = self.slots.current_token() {
                    debug!("Media with token {} about to end", token);
                    self.emit(PipelineEvent::MediaAboutToEnd { token });
                }
            }
            EngineNotification::SeekabilityChanged(seekable) => {
                if self.state != PipelineState::Idle && self.seekable != Some(seekable) {
                    debug!("Current media seekable: {}", seekable);
                    self.seekable = Some(seekable);
                    self.emit(PipelineEvent::SeekabilityChanged {
                        token: self.engine_token,
                        seekable,
                    });
                }
            }
            EngineNotification::LiveChanged(live) => {
                if self.state != PipelineState::Idle && self.live != Some(live) {
                    debug!("Current media live: {}", live);
                    self.live = Some(live);
                    self.emit(PipelineEvent::LiveChanged {
                        token: self.engine_token,
                        live,
                    });
                }
            }
            EngineNotification::Tags(tags) => {
                if self.state != PipelineState::Idle {
                    self.emit(PipelineEvent::TagsUpdated {
                        token: self.engine_token,
                        tags,
                    });
                }
            }
            EngineNotification::Info(message) => {
                info!("Engine info: {}", message);
                self.emit(PipelineEvent::Info { message });
            }
            EngineNotification::Warning(message) => {
                warn!("Engine warning: {}", message);
                self.emit(PipelineEvent::Warning { message });
            }
        }
    }

    fn on_state_reached(&mut self, reached: EngineState) {
        match (self.state, reached) {
            (PipelineState::Starting, EngineState::Playing) => {
                self.awaited_engine_state = None;
                self.refresh_durations();
                if self.config.start_paused {
                    self.request_engine_pause(true);
                    self.settle(PipelineState::Paused);
                } else {
                    self.settle(PipelineState::Playing);
                }
            }
            (PipelineState::Starting, EngineState::Paused) => {
                self.refresh_durations();
                if self.config.start_paused {
                    self.awaited_engine_state = None;
                    self.settle(PipelineState::Paused);
                } else {
                    debug!("Engine settled paused during start, requesting playback");
                    self.request_engine_pause(false);
                }
            }
            (PipelineState::Stopping, EngineState::Stopped) => self.enter_idle(),
            (
                PipelineState::Playing
                | PipelineState::Paused
                | PipelineState::Seeking
                | PipelineState::Buffering,
                EngineState::Stopped,
            ) => {
                warn!("Engine stopped unexpectedly in state {}", self.state);
                self.postponed.clear();
                self.enter_idle();
            }
            (state, reached) if state.is_active() => self.follow_engine(reached),
            (state, reached) => {
                debug!("Ignoring engine state {} in state {}", reached, state);
            }
        }
    }

    /// Track playing/paused changes the engine made on its own
    fn follow_engine(&mut self, reached: EngineState) {
        if let Some(awaited) = self.awaited_engine_state {
            if awaited == reached {
                self.awaited_engine_state = None;
            } else {
                debug!("Ignoring stale engine state {} (awaiting {})", reached, awaited);
            }
            return;
        }

        let target = match reached {
            EngineState::Playing => PipelineState::Playing,
            EngineState::Paused => PipelineState::Paused,
            EngineState::Stopped => return,
        };
        if target != self.state {
            info!("Following engine-driven change to {}", target);
            self.settle(target);
        }
    }

    fn on_end_of_stream(&mut self) {
        let resume = match self.state {
            PipelineState::Playing => PipelineState::Playing,
            PipelineState::Buffering => self.resume_state,
            state => {
                debug!("Ignoring end of stream in state {}", state);
                return;
            }
        };
        match self.slots.advance().cloned() {
            Some(next) => self.hand_off(next, resume),
            None => {
                info!("End of stream with nothing scheduled");
                self.begin_stop();
                self.emit(PipelineEvent::EndOfStream {
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    /// Gapless continuation into the promoted next slot, settling in `resume`
    fn hand_off(&mut self, next: Slot, resume: PipelineState) {
        info!("Continuing with {} (token {})", next.media, next.token);
        self.forget_media_properties();

        if let Err(e) = self.engine.build_and_start(next.token, &next.media) {
            self.reject_start(next.token, &next.media, &e);
            return;
        }

        self.engine_token = Some(next.token);
        self.awaited_engine_state = Some(EngineState::Playing);
        self.emit(PipelineEvent::MediaStarted {
            token: next.token,
            uri: next.media.uri().to_string(),
            timestamp: chrono::Utc::now(),
        });
        self.refresh_durations();
        if resume == PipelineState::Paused {
            self.request_engine_pause(true);
        }
        self.settle(resume);
    }

    fn on_buffering(&mut self, percent: u8) {
        self.emit(PipelineEvent::BufferingUpdated {
            token: self.engine_token,
            percent,
        });

        if self.live == Some(true) {
            trace!("Live media buffering at {}%, not pausing", percent);
            return;
        }

        let low = self.config.buffering_low_watermark;
        let high = self.config.buffering_high_watermark;

        match self.state {
            state if state.is_active() && percent < low => {
                debug!("Buffer at {}% in state {}, refilling", percent, state);
                self.resume_state = state;
                if state == PipelineState::Playing {
                    self.request_engine_pause(true);
                }
                self.set_state(PipelineState::Buffering);
            }
            PipelineState::Buffering if percent >= high => {
                let resume = self.resume_state;
                debug!("Buffer refilled, returning to {}", resume);
                if resume == PipelineState::Playing {
                    self.request_engine_pause(false);
                }
                self.settle(resume);
            }
            _ => {}
        }
    }

    fn on_seek_done(&mut self) {
        if self.state != PipelineState::Seeking {
            debug!("Ignoring seek completion in state {}", self.state);
            return;
        }
        let resume = self.resume_state;
        debug!("Seek finished, returning to {}", resume);
        self.settle(resume);
    }

    fn on_engine_error(&mut self, kind: EngineErrorKind, message: String) {
        if self.config.is_fatal(kind) {
            error!("Fatal engine error ({}): {} - resetting to idle", kind, message);
            self.engine.stop_now();
            self.postponed.clear();
            self.enter_idle();
            self.emit(PipelineEvent::Error {
                kind,
                message,
                fatal: true,
                timestamp: chrono::Utc::now(),
            });
            return;
        }

        warn!("Recoverable engine error ({}) in state {}: {}", kind, self.state, message);
        match self.state {
            // The awaited start acknowledgement will not come
            PipelineState::Starting => self.abort_start(kind, message),
            PipelineState::Seeking => {
                self.emit(PipelineEvent::Error {
                    kind,
                    message,
                    fatal: false,
                    timestamp: chrono::Utc::now(),
                });
                let resume = self.resume_state;
                debug!("Seek failed, returning to {}", resume);
                self.settle(resume);
            }
            _ => self.emit(PipelineEvent::Error {
                kind,
                message,
                fatal: false,
                timestamp: chrono::Utc::now(),
            }),
        }
    }
}
