//! Simulated streaming engine
//!
//! Drives a virtual clock on a tokio ticker task instead of decoding
//! anything. Media durations come from the payload's `duration_ms` field
//! (or the configured default). URIs with the `missing` scheme, and
//! `file://` paths that do not exist, are refused at build time.
//!
//! Payload fields understood:
//! - `duration_ms` (integer): media length
//! - `seekable` (bool, default true): whether seeks are accepted
//! - `live` (bool, default false): reported as a live source
//! - `tags` (object): reported as metadata tags once playback is up
//!
//! Every notification is stamped with the token of the media that was
//! current when it was produced.

use super::{
    EngineAdapter, EngineMessage, EngineNotification, EngineResult, EngineState,
    NotificationSender,
};
use crate::config::SimulatedEngineConfig;
use crate::error::EngineError;
use crate::media::Media;
use playctl_common::events::EngineErrorKind;
use playctl_common::human_time::{millis_to_nanos, nanos_to_millis};
use playctl_common::{PositionUnit, Token, VolumeFormat};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct SimMedia {
    token: Token,
    uri: String,
    duration_ms: u64,
    seekable: bool,
    live: bool,
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    /// `paused` records a pause request made before the graph was up
    Starting { remaining_ms: u64, paused: bool },
    Playing,
    Paused,
    /// Reached the end, waiting for the next build or a stop
    Ended,
}

#[derive(Debug)]
struct SimState {
    phase: Phase,
    current: Option<SimMedia>,
    prepared: Option<SimMedia>,
    position_ms: u64,
    about_to_end_sent: bool,
    volume: f64,
    muted: bool,
    /// Notifications waiting for the next tick
    outbox: Vec<EngineMessage>,
}

impl SimState {
    fn new() -> Self {
        Self {
            phase: Phase::Stopped,
            current: None,
            prepared: None,
            position_ms: 0,
            about_to_end_sent: false,
            volume: 1.0,
            muted: false,
            outbox: Vec::new(),
        }
    }

    /// Queue a notification stamped with the current media's token
    fn post(&mut self, notification: EngineNotification) {
        let token = self.current.as_ref().map(|m| m.token);
        self.outbox.push(EngineMessage::new(token, notification));
    }

    fn go_live(&mut self, paused: bool) {
        let reached = if paused {
            self.phase = Phase::Paused;
            EngineState::Paused
        } else {
            self.phase = Phase::Playing;
            EngineState::Playing
        };
        self.post(EngineNotification::StateReached(reached));
        self.post(EngineNotification::DurationChanged);

        let Some(media) = self.current.clone() else {
            return;
        };
        self.post(EngineNotification::SeekabilityChanged(media.seekable));
        self.post(EngineNotification::LiveChanged(media.live));
        if !media.tags.is_empty() {
            self.post(EngineNotification::Tags(media.tags));
        }
    }

    /// Advance the virtual clock by one tick
    fn advance(&mut self, config: &SimulatedEngineConfig) {
        match self.phase {
            Phase::Starting {
                remaining_ms,
                paused,
            } => {
                if remaining_ms <= config.tick_ms {
                    self.go_live(paused);
                } else {
                    self.phase = Phase::Starting {
                        remaining_ms: remaining_ms - config.tick_ms,
                        paused,
                    };
                }
            }
            Phase::Playing => {
                let duration_ms = match &self.current {
                    Some(media) => media.duration_ms,
                    None => return,
                };
                self.position_ms = (self.position_ms + config.tick_ms).min(duration_ms);

                let remaining = duration_ms - self.position_ms;
                if !self.about_to_end_sent && remaining <= config.about_to_end_ms {
                    self.about_to_end_sent = true;
                    self.post(EngineNotification::AboutToEnd);
                }
                if remaining == 0 {
                    self.phase = Phase::Ended;
                    self.post(EngineNotification::EndOfStream);
                }
            }
            Phase::Stopped | Phase::Paused | Phase::Ended => {}
        }
    }
}

fn lock(shared: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Virtual-clock engine adapter
pub struct SimulatedEngine {
    config: SimulatedEngineConfig,
    shared: Arc<Mutex<SimState>>,
    ticker: JoinHandle<()>,
}

impl SimulatedEngine {
    /// Create the engine and spawn its ticker task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: SimulatedEngineConfig, notifier: NotificationSender) -> Self {
        let shared = Arc::new(Mutex::new(SimState::new()));
        let ticker = tokio::spawn(run_ticker(Arc::clone(&shared), notifier, config.clone()));
        info!(
            "Simulated engine started (tick {}ms, default duration {}ms)",
            config.tick_ms, config.default_duration_ms
        );
        Self {
            config,
            shared,
            ticker,
        }
    }

    fn check_media(&self, token: Token, media: &Media) -> EngineResult<SimMedia> {
        match media.scheme() {
            Some("missing") => {
                return Err(EngineError::new(
                    EngineErrorKind::Resource,
                    format!("media not found: {}", media.uri()),
                ))
            }
            Some("file") => {
                let path = media.uri().trim_start_matches("file://");
                if !Path::new(path).exists() {
                    return Err(EngineError::new(
                        EngineErrorKind::Resource,
                        format!("file not found: {}", path),
                    ));
                }
            }
            None => {
                if !Path::new(media.uri()).exists() {
                    return Err(EngineError::new(
                        EngineErrorKind::Resource,
                        format!("file not found: {}", media.uri()),
                    ));
                }
            }
            Some(_) => {}
        }

        let flag = |key: &str| {
            media
                .payload()
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_bool())
        };
        let tags = media
            .payload()
            .and_then(|p| p.get("tags"))
            .and_then(|v| v.as_object())
            .map(|object| {
                object
                    .iter()
                    .map(|(key, value)| {
                        let text = value
                            .as_str()
                            .map(str::to_string)
                            .unwrap_or_else(|| value.to_string());
                        (key.clone(), text)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(SimMedia {
            token,
            uri: media.uri().to_string(),
            duration_ms: media
                .payload_u64("duration_ms")
                .unwrap_or(self.config.default_duration_ms),
            seekable: flag("seekable").unwrap_or(true),
            live: flag("live").unwrap_or(false),
            tags,
        })
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        lock(&self.shared)
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn run_ticker(
    shared: Arc<Mutex<SimState>>,
    notifier: NotificationSender,
    config: SimulatedEngineConfig,
) {
    let mut ticker = interval(Duration::from_millis(config.tick_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let outgoing = {
            let mut state = lock(&shared);
            state.advance(&config);
            std::mem::take(&mut state.outbox)
        };

        for notification in outgoing {
            if notifier.notify_async(notification).await.is_err() {
                debug!("Notification receiver dropped, simulated engine ticker exiting");
                return;
            }
        }
    }
}

impl EngineAdapter for SimulatedEngine {
    fn build_and_start(&mut self, token: Token, media: &Media) -> EngineResult<()> {
        let sim = self.check_media(token, media)?;
        let startup_delay_ms = self.config.startup_delay_ms;
        let mut state = self.state();

        let prerolled = state
            .prepared
            .take()
            .map(|p| p.token == token && p.uri == sim.uri)
            .unwrap_or(false);

        debug!(
            "Simulated build for {} (token {}, {}ms, prerolled: {})",
            sim.uri, token, sim.duration_ms, prerolled
        );

        state.current = Some(sim);
        state.position_ms = 0;
        state.about_to_end_sent = false;

        if prerolled {
            state.go_live(false);
        } else {
            state.phase = Phase::Starting {
                remaining_ms: startup_delay_ms,
                paused: false,
            };
        }
        Ok(())
    }

    fn prepare_next(&mut self, token: Token, media: &Media) {
        let checked = self.check_media(token, media);
        let mut state = self.state();
        match checked {
            Ok(sim) => {
                debug!("Prerolling {} (token {})", sim.uri, token);
                state.post(EngineNotification::Info(format!("prerolled {}", sim.uri)));
                state.prepared = Some(sim);
            }
            Err(e) => {
                state.prepared = None;
                state.post(EngineNotification::Warning(format!("cannot preroll {}: {}", media, e)));
            }
        }
    }

    fn stop_now(&mut self) {
        let mut state = self.state();
        state.post(EngineNotification::StateReached(EngineState::Stopped));
        state.phase = Phase::Stopped;
        state.current = None;
        state.prepared = None;
        state.position_ms = 0;
    }

    fn set_paused(&mut self, paused: bool) {
        let mut state = self.state();
        match (state.phase, paused) {
            (Phase::Playing, true) => {
                state.phase = Phase::Paused;
                state.post(EngineNotification::StateReached(EngineState::Paused));
            }
            (Phase::Paused, false) => {
                state.phase = Phase::Playing;
                state.post(EngineNotification::StateReached(EngineState::Playing));
            }
            (Phase::Starting { remaining_ms, .. }, paused) => {
                state.phase = Phase::Starting {
                    remaining_ms,
                    paused,
                };
            }
            _ => {}
        }
    }

    fn seek(&mut self, position: u64, unit: PositionUnit) -> EngineResult<()> {
        let byte_rate = self.config.byte_rate;
        let about_to_end_ms = self.config.about_to_end_ms;
        let mut state = self.state();

        let media = state
            .current
            .clone()
            .ok_or_else(|| EngineError::new(EngineErrorKind::Internal, "nothing loaded"))?;
        if !media.seekable {
            return Err(EngineError::new(EngineErrorKind::Stream, "media is not seekable"));
        }

        let target_ms = match unit {
            PositionUnit::Nanoseconds => nanos_to_millis(position),
            PositionUnit::Bytes => match byte_rate {
                Some(rate) => position.saturating_mul(1000) / rate,
                None => {
                    return Err(EngineError::new(
                        EngineErrorKind::Stream,
                        "byte positions are not supported",
                    ))
                }
            },
        };

        state.position_ms = target_ms.min(media.duration_ms);
        state.about_to_end_sent = media.duration_ms - state.position_ms <= about_to_end_ms;
        if state.phase == Phase::Ended {
            state.phase = Phase::Playing;
        }
        state.post(EngineNotification::SeekDone);
        Ok(())
    }

    fn get_position(&self, unit: PositionUnit) -> Option<u64> {
        let state = self.state();
        state.current.as_ref()?;
        to_unit(state.position_ms, unit, self.config.byte_rate)
    }

    fn get_duration(&self, unit: PositionUnit) -> Option<u64> {
        let state = self.state();
        let duration_ms = state.current.as_ref()?.duration_ms;
        to_unit(duration_ms, unit, self.config.byte_rate)
    }

    fn supports_volume(&self) -> bool {
        self.config.supports_volume
    }

    fn set_volume(&mut self, volume: f64, format: VolumeFormat) {
        self.state().volume = format.to_linear(volume);
    }

    fn get_volume(&self, format: VolumeFormat) -> f64 {
        VolumeFormat::Linear.convert(self.state().volume, format)
    }

    fn set_muted(&mut self, muted: bool) {
        self.state().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.state().muted
    }
}

fn to_unit(millis: u64, unit: PositionUnit, byte_rate: Option<u64>) -> Option<u64> {
    match unit {
        PositionUnit::Nanoseconds => Some(millis_to_nanos(millis)),
        PositionUnit::Bytes => byte_rate.map(|rate| millis.saturating_mul(rate) / 1000),
    }
}
