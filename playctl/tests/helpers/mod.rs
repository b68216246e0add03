//! Shared test infrastructure for controller integration tests
//!
//! - `RecordingEngine`: scripted engine adapter that records every call
//! - `Harness`: controller plus engine script plus event receiver

#![allow(dead_code)]

use playctl::config::ControllerConfig;
use playctl::engine::{
    EngineAdapter, EngineMessage, EngineNotification, EngineResult, EngineState,
};
use playctl::error::EngineError;
use playctl::media::Media;
use playctl::pipeline::{Pipeline, PipelineController};
use playctl_common::events::EngineErrorKind;
use playctl_common::{PipelineEvent, PipelineState, PositionUnit, Token, VolumeFormat};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// One adapter call as seen by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BuildAndStart(Token, String),
    PrepareNext(Token, String),
    StopNow,
    SetPaused(bool),
    Seek(u64, PositionUnit),
    SetVolume(f64, VolumeFormat),
    SetMuted(bool),
}

/// Knobs a test can turn while the controller owns the engine
#[derive(Debug)]
pub struct Script {
    pub calls: Vec<Call>,
    /// Token of the last graph built; stamps injected notifications
    pub engine_token: Option<Token>,
    /// URIs refused by `build_and_start`
    pub rejected: Vec<String>,
    pub seek_fails: bool,
    pub supports_volume: bool,
    pub duration_ns: Option<u64>,
    pub duration_bytes: Option<u64>,
    pub position_ns: Option<u64>,
    /// Linear volume
    pub volume: f64,
    pub muted: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            engine_token: None,
            rejected: Vec::new(),
            seek_fails: false,
            supports_volume: true,
            duration_ns: Some(180_000_000_000),
            duration_bytes: None,
            position_ns: Some(0),
            volume: 1.0,
            muted: false,
        }
    }
}

pub type SharedScript = Arc<Mutex<Script>>;

/// Engine adapter that only records; notifications are injected by the test
pub struct RecordingEngine {
    script: SharedScript,
}

impl RecordingEngine {
    pub fn new(script: SharedScript) -> Self {
        Self { script }
    }

    fn record(&self, call: Call) {
        self.script.lock().unwrap().calls.push(call);
    }
}

impl EngineAdapter for RecordingEngine {
    fn build_and_start(&mut self, token: Token, media: &Media) -> EngineResult<()> {
        self.record(Call::BuildAndStart(token, media.uri().to_string()));
        let mut script = self.script.lock().unwrap();
        if script.rejected.iter().any(|uri| uri == media.uri()) {
            return Err(EngineError::new(EngineErrorKind::Resource, "no such media"));
        }
        script.engine_token = Some(token);
        Ok(())
    }

    fn prepare_next(&mut self, token: Token, media: &Media) {
        self.record(Call::PrepareNext(token, media.uri().to_string()));
    }

    fn stop_now(&mut self) {
        self.record(Call::StopNow);
    }

    fn set_paused(&mut self, paused: bool) {
        self.record(Call::SetPaused(paused));
    }

    fn seek(&mut self, position: u64, unit: PositionUnit) -> EngineResult<()> {
        self.record(Call::Seek(position, unit));
        if self.script.lock().unwrap().seek_fails {
            return Err(EngineError::new(EngineErrorKind::Stream, "seek refused"));
        }
        Ok(())
    }

    fn get_position(&self, unit: PositionUnit) -> Option<u64> {
        match unit {
            PositionUnit::Nanoseconds => self.script.lock().unwrap().position_ns,
            PositionUnit::Bytes => None,
        }
    }

    fn get_duration(&self, unit: PositionUnit) -> Option<u64> {
        let script = self.script.lock().unwrap();
        match unit {
            PositionUnit::Nanoseconds => script.duration_ns,
            PositionUnit::Bytes => script.duration_bytes,
        }
    }

    fn supports_volume(&self) -> bool {
        self.script.lock().unwrap().supports_volume
    }

    fn set_volume(&mut self, volume: f64, format: VolumeFormat) {
        self.record(Call::SetVolume(volume, format));
        self.script.lock().unwrap().volume = format.to_linear(volume);
    }

    fn get_volume(&self, format: VolumeFormat) -> f64 {
        format.from_linear(self.script.lock().unwrap().volume)
    }

    fn set_muted(&mut self, muted: bool) {
        self.record(Call::SetMuted(muted));
        self.script.lock().unwrap().muted = muted;
    }

    fn is_muted(&self) -> bool {
        self.script.lock().unwrap().muted
    }
}

/// Controller under test with its engine script and an event receiver
pub struct Harness {
    pub controller: PipelineController<RecordingEngine>,
    pub script: SharedScript,
    pub events: broadcast::Receiver<PipelineEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        Self::with_script(config, Script::default())
    }

    pub fn with_script(config: ControllerConfig, script: Script) -> Self {
        let script = Arc::new(Mutex::new(script));
        let controller =
            PipelineController::new(RecordingEngine::new(Arc::clone(&script)), config);
        let events = controller.subscribe();
        Self {
            controller,
            script,
            events,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.controller.get_current_state()
    }

    /// Deliver a notification stamped with the engine's current graph
    pub fn notify(&self, notification: EngineNotification) {
        let token = self.script.lock().unwrap().engine_token;
        self.notify_from(token, notification);
    }

    /// Deliver a notification stamped with an explicit graph token
    pub fn notify_from(&self, token: Option<Token>, notification: EngineNotification) {
        self.controller
            .handle_notification(EngineMessage::new(token, notification));
    }

    pub fn engine_reached(&self, state: EngineState) {
        self.notify(EngineNotification::StateReached(state));
    }

    /// Play `uri` with a fresh token
    pub fn play(&self, uri: &str, now: bool) -> Token {
        let token = self.controller.get_new_token();
        self.controller
            .play_media(token, Media::new(uri), now)
            .expect("play_media failed");
        token
    }

    /// Play now and acknowledge the start, ending in Playing
    pub fn start_playing(&self, uri: &str) -> Token {
        let token = self.play(uri, true);
        self.engine_reached(EngineState::Playing);
        assert_eq!(self.state(), PipelineState::Playing);
        token
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.lock().unwrap().calls.clear();
    }

    /// Every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<PipelineEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    /// State transitions since the last drain as (old, new) pairs
    pub fn drain_transitions(&mut self) -> Vec<(PipelineState, PipelineState)> {
        self.drain_events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::StateChanged {
                    old_state,
                    new_state,
                    ..
                } => Some((old_state, new_state)),
                _ => None,
            })
            .collect()
    }

    pub fn current_token(&self) -> Option<Token> {
        self.controller.current_media().map(|slot| slot.token)
    }

    pub fn current_uri(&self) -> Option<String> {
        self.controller
            .current_media()
            .map(|slot| slot.media.uri().to_string())
    }

    pub fn next_token(&self) -> Option<Token> {
        self.controller.next_media().map(|slot| slot.token)
    }

    pub fn next_uri(&self) -> Option<String> {
        self.controller
            .next_media()
            .map(|slot| slot.media.uri().to_string())
    }
}
