//! End-to-end playback against the simulated engine

use playctl::config::{ControllerConfig, SimulatedEngineConfig};
use playctl::engine::{notification_channel, SimulatedEngine};
use playctl::media::Media;
use playctl::pipeline::{Pipeline, PipelineController};
use playctl::Error;
use playctl_common::{PipelineEvent, PipelineState, PositionUnit};
use serde_json::json;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;

struct Rig {
    controller: PipelineController<SimulatedEngine>,
    events: broadcast::Receiver<PipelineEvent>,
    handler: JoinHandle<()>,
}

fn rig() -> Rig {
    rig_with(10)
}

fn rig_with(startup_delay_ms: u64) -> Rig {
    let config = ControllerConfig::default();
    let (tx, rx) = notification_channel(config.notification_capacity);
    let engine = SimulatedEngine::spawn(
        SimulatedEngineConfig {
            default_duration_ms: 10_000,
            tick_ms: 5,
            about_to_end_ms: 20,
            byte_rate: Some(1_000),
            supports_volume: true,
            startup_delay_ms,
        },
        tx,
    );
    let controller = PipelineController::new(engine, config);
    let events = controller.subscribe();
    let handler = controller.spawn_notification_handler(rx);
    Rig {
        controller,
        events,
        handler,
    }
}

fn short(uri: &str, duration_ms: u64) -> Media {
    Media::with_payload(uri, json!({ "duration_ms": duration_ms }))
}

/// Wait for the first event matching `pred`, collecting everything seen
async fn wait_for(
    rx: &mut broadcast::Receiver<PipelineEvent>,
    seen: &mut Vec<PipelineEvent>,
    pred: impl Fn(&PipelineEvent) -> bool,
) -> PipelineEvent {
    timeout(Duration::from_secs(5), async {
        loop {
            let event = rx.recv().await.expect("event bus closed");
            seen.push(event.clone());
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

fn entered(state: PipelineState) -> impl Fn(&PipelineEvent) -> bool {
    move |event| matches!(event, PipelineEvent::StateChanged { new_state, .. } if *new_state == state)
}

#[tokio::test]
async fn test_media_plays_to_end_and_goes_idle() {
    let mut rig = rig();
    let mut seen = Vec::new();
    let token = rig.controller.get_new_token();

    rig.controller
        .play_media(token, short("sim://short", 300), true)
        .unwrap();
    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Playing)).await;
    assert_eq!(
        rig.controller.get_duration(PositionUnit::Nanoseconds),
        Some(300_000_000)
    );
    assert_eq!(rig.controller.get_duration(PositionUnit::Bytes), Some(300));

    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Idle)).await;

    assert!(seen
        .iter()
        .any(|e| matches!(e, PipelineEvent::MediaAboutToEnd { token: t } if *t == token)));
    assert!(seen
        .iter()
        .any(|e| matches!(e, PipelineEvent::EndOfStream { .. })));
    assert!(rig.controller.current_media().is_none());
    rig.handler.abort();
}

#[tokio::test]
async fn test_gapless_continuation_never_idles() {
    let mut rig = rig();
    let mut seen = Vec::new();
    let first = rig.controller.get_new_token();
    let second = rig.controller.get_new_token();

    rig.controller
        .play_media(first, short("sim://one", 50), true)
        .unwrap();
    rig.controller
        .play_media(second, short("sim://two", 50), false)
        .unwrap();

    wait_for(&mut rig.events, &mut seen, |e| {
        matches!(e, PipelineEvent::MediaStarted { token, .. } if *token == second)
    })
    .await;
    let idle = entered(PipelineState::Idle);
    assert!(!seen.iter().any(|e| idle(e)));
    assert_eq!(rig.controller.current_media().map(|s| s.token), Some(second));

    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Idle)).await;
    let ends = seen
        .iter()
        .filter(|e| matches!(e, PipelineEvent::EndOfStream { .. }))
        .count();
    assert_eq!(ends, 1);
    rig.handler.abort();
}

#[tokio::test]
async fn test_missing_media_is_rejected() {
    let rig = rig();
    let token = rig.controller.get_new_token();
    let result = rig
        .controller
        .play_media(token, Media::new("missing://nowhere"), true);
    assert!(matches!(result, Err(Error::Rejected(_))));
    assert_eq!(rig.controller.get_current_state(), PipelineState::Idle);
    rig.handler.abort();
}

#[tokio::test]
async fn test_seek_and_pause_round_trip() {
    let mut rig = rig();
    let mut seen = Vec::new();
    let token = rig.controller.get_new_token();

    rig.controller
        .play_media(token, Media::new("sim://long"), true)
        .unwrap();
    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Playing)).await;

    rig.controller
        .set_current_position(5_000_000_000, PositionUnit::Nanoseconds);
    assert_eq!(rig.controller.get_current_state(), PipelineState::Seeking);
    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Playing)).await;
    let position = rig
        .controller
        .get_current_position(PositionUnit::Nanoseconds)
        .unwrap();
    assert!(position >= 5_000_000_000);

    rig.controller.set_paused(true);
    assert!(rig.controller.is_paused());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(rig.controller.get_current_state(), PipelineState::Paused);

    rig.controller.stop();
    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Idle)).await;
    rig.handler.abort();
}

#[tokio::test]
async fn test_stop_during_start_settles_idle() {
    let mut rig = rig();
    let mut seen = Vec::new();
    let token = rig.controller.get_new_token();

    rig.controller
        .play_media(token, Media::new("sim://a"), true)
        .unwrap();
    rig.controller.stop();
    assert!(rig.controller.has_pending_intents());

    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Idle)).await;
    assert!(!rig.controller.has_pending_intents());
    rig.handler.abort();
}

#[tokio::test]
async fn test_resume_ack_of_old_media_does_not_finish_new_start() {
    let mut rig = rig_with(200);
    let mut seen = Vec::new();
    let first = rig.controller.get_new_token();

    rig.controller
        .play_media(first, Media::new("sim://a"), true)
        .unwrap();
    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Playing)).await;
    rig.controller.set_paused(true);
    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Paused)).await;

    // The engine acks the resume of A after B has replaced it
    rig.controller.set_paused(false);
    let second = rig.controller.get_new_token();
    rig.controller
        .play_media(second, Media::new("sim://b"), true)
        .unwrap();
    rig.controller.set_paused(true);
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(rig.controller.get_current_state(), PipelineState::Starting);
    assert!(rig.controller.has_pending_intents());

    wait_for(&mut rig.events, &mut seen, entered(PipelineState::Paused)).await;
    assert_eq!(rig.controller.current_media().map(|s| s.token), Some(second));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(rig.controller.get_current_state(), PipelineState::Paused);
    assert!(rig.controller.is_paused());
    rig.handler.abort();
}
