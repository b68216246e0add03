//! Volume formats, mute, and duration reporting per position unit

mod helpers;

use helpers::{Call, Harness, Script};
use playctl::config::ControllerConfig;
use playctl::engine::EngineNotification;
use playctl::pipeline::Pipeline;
use playctl_common::{PipelineEvent, PositionUnit, VolumeFormat};

fn duration_updates(events: Vec<PipelineEvent>) -> Vec<(PositionUnit, Option<u64>)> {
    events
        .into_iter()
        .filter_map(|event| match event {
            PipelineEvent::DurationUpdated { unit, duration, .. } => Some((unit, duration)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_volume_passes_through_when_settled() {
    let h = Harness::new();
    h.controller.set_volume(0.125, VolumeFormat::Linear);
    assert_eq!(h.calls(), vec![Call::SetVolume(0.125, VolumeFormat::Linear)]);

    assert!((h.controller.get_volume(VolumeFormat::Linear) - 0.125).abs() < 1e-9);
    assert!((h.controller.get_volume(VolumeFormat::Cubic) - 0.5).abs() < 1e-9);
}

#[test]
fn test_decibel_volume() {
    let h = Harness::new();
    h.controller.set_volume(-20.0, VolumeFormat::Decibels);
    assert!((h.controller.get_volume(VolumeFormat::Linear) - 0.1).abs() < 1e-9);
    assert!((h.controller.get_volume(VolumeFormat::Decibels) + 20.0).abs() < 1e-9);
}

#[test]
fn test_pending_volume_converted_to_requested_format() {
    let h = Harness::new();
    h.play("sim://a", true);
    h.controller.set_volume(0.5, VolumeFormat::Cubic);
    assert!((h.controller.get_volume(VolumeFormat::Linear) - 0.125).abs() < 1e-9);
}

#[test]
fn test_mute_passes_through() {
    let h = Harness::new();
    h.start_playing("sim://a");
    h.controller.set_muted(true);
    assert!(h.controller.is_muted());
    h.controller.set_muted(false);
    assert!(!h.controller.is_muted());
}

#[test]
fn test_engine_without_volume_support() {
    let script = Script {
        supports_volume: false,
        volume: 0.3,
        muted: true,
        ..Script::default()
    };
    let h = Harness::with_script(ControllerConfig::default(), script);
    h.start_playing("sim://a");
    h.clear_calls();

    h.controller.set_volume(0.5, VolumeFormat::Linear);
    h.controller.set_muted(true);
    assert!(h.calls().is_empty());
    assert!(!h.controller.has_pending_intents());

    assert_eq!(h.controller.get_volume(VolumeFormat::Linear), 1.0);
    assert_eq!(h.controller.get_volume(VolumeFormat::Decibels), 0.0);
    assert!(!h.controller.is_muted());
}

#[test]
fn test_durations_reported_when_playback_starts() {
    let script = Script {
        duration_ns: Some(90_000_000_000),
        duration_bytes: Some(15_876_000),
        ..Script::default()
    };
    let mut h = Harness::with_script(ControllerConfig::default(), script);

    h.play("sim://a", true);
    assert_eq!(h.controller.get_duration(PositionUnit::Nanoseconds), None);

    h.engine_reached(playctl::engine::EngineState::Playing);
    assert_eq!(
        h.controller.get_duration(PositionUnit::Nanoseconds),
        Some(90_000_000_000)
    );
    assert_eq!(h.controller.get_duration(PositionUnit::Bytes), Some(15_876_000));
    assert_eq!(
        duration_updates(h.drain_events()),
        vec![
            (PositionUnit::Nanoseconds, Some(90_000_000_000)),
            (PositionUnit::Bytes, Some(15_876_000))
        ]
    );
}

#[test]
fn test_unresolvable_duration_stays_unknown() {
    let mut h = Harness::new();
    h.start_playing("sim://a");
    assert_eq!(h.controller.get_duration(PositionUnit::Bytes), None);
    assert!(!duration_updates(h.drain_events())
        .iter()
        .any(|(unit, _)| *unit == PositionUnit::Bytes));
}

#[test]
fn test_duration_change_only_reports_changed_units() {
    let mut h = Harness::new();
    h.start_playing("sim://a");
    h.drain_events();

    h.notify(EngineNotification::DurationChanged);
    assert!(duration_updates(h.drain_events()).is_empty());

    h.script.lock().unwrap().duration_ns = Some(200_000_000_000);
    h.notify(EngineNotification::DurationChanged);
    assert_eq!(
        duration_updates(h.drain_events()),
        vec![(PositionUnit::Nanoseconds, Some(200_000_000_000))]
    );
}

#[test]
fn test_durations_cleared_on_idle() {
    let mut h = Harness::new();
    h.start_playing("sim://a");
    h.drain_events();

    h.controller.stop();
    h.engine_reached(playctl::engine::EngineState::Stopped);
    assert_eq!(h.controller.get_duration(PositionUnit::Nanoseconds), None);
    assert_eq!(
        duration_updates(h.drain_events()),
        vec![(PositionUnit::Nanoseconds, None)]
    );
}

#[test]
fn test_duration_change_ignored_when_idle() {
    let mut h = Harness::new();
    h.notify(EngineNotification::DurationChanged);
    assert!(h.drain_events().is_empty());
    assert_eq!(h.controller.get_duration(PositionUnit::Nanoseconds), None);
}
