//! End-to-end session lifecycle tests against stub capabilities.

use std::sync::Arc;
use std::time::Duration;

use sightguide::media::SyntheticDevices;
use sightguide::{
    CameraError, RecordingSurface, SessionController, SessionError, SessionState,
    SightguideConfig, StubSpeech,
};

fn test_config(model_url: &str) -> SightguideConfig {
    let mut config = SightguideConfig::default();
    config.model.url = model_url.to_string();
    config.sampler.tick_ms = 5;
    config
}

fn session(labels: &[&str], model_url: &str) -> (Arc<StubSpeech>, SessionController) {
    let config = test_config(model_url);
    let devices = Arc::new(SyntheticDevices::new(labels, 64, 48));
    let engine = Arc::new(StubSpeech::new());
    let surface = Arc::new(RecordingSurface::new());
    let session = SessionController::new(devices, engine.clone(), surface, &config);
    (engine, session)
}

/// Sampler-active iff Running, across an arbitrary command prefix.
fn assert_invariant(session: &SessionController) {
    assert_eq!(
        session.sampler_active(),
        session.state() == SessionState::Running,
        "sampler handle must exist iff the session is Running (state: {:?})",
        session.state()
    );
}

#[test]
fn sampler_exists_iff_running_for_all_command_prefixes() {
    let (_engine, mut session) = session(&["Front Camera", "Back Camera"], "stub://coco");
    assert_invariant(&session);

    session.start().expect("first start");
    assert_invariant(&session);
    assert_eq!(session.state(), SessionState::Running);

    // A second start while running is a no-op, not a second sampler.
    session.start().expect("redundant start");
    assert_invariant(&session);

    session.switch_camera().expect("switch");
    assert_invariant(&session);
    assert_eq!(session.state(), SessionState::Running);

    session.stop();
    assert_invariant(&session);
    assert_eq!(session.state(), SessionState::Stopped);

    session.stop();
    assert_invariant(&session);

    session.start().expect("restart");
    assert_invariant(&session);

    session.stop();
    assert_invariant(&session);
}

#[test]
fn stop_when_stopped_and_switch_without_stream_are_noops() {
    let (_engine, mut session) = session(&["cam"], "stub://coco");

    session.stop();
    assert_eq!(session.state(), SessionState::Stopped);

    session.switch_camera().expect("switch without stream");
    assert!(!session.is_camera_running());
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn scripted_transitions_announce_once_per_transition() {
    let (engine, mut session) =
        session(&["Front Camera", "Back Camera"], "scripted://person,person,dog");

    session.start().expect("start");
    // 5 ms ticks: the three scripted entries are consumed almost
    // immediately, after which every frame reports empty.
    std::thread::sleep(Duration::from_millis(200));
    session.stop();

    assert_eq!(engine.utterances(), vec!["person", "dog"]);
}

#[test]
fn stop_resets_memory_and_silences_late_results() {
    let (engine, mut session) = session(&["cam"], "scripted://cup,cup,cup,cup,cup");

    session.start().expect("start");
    std::thread::sleep(Duration::from_millis(100));
    session.stop();

    assert_eq!(session.last_announced(), None);
    assert!(engine.cancellations() >= 1);

    // Nothing speaks after stop, even though inference was mid-flight
    // when the session ended.
    let spoken = engine.utterances().len();
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(engine.utterances().len(), spoken);
}

#[test]
fn start_with_zero_devices_surfaces_no_device_and_stays_stopped() {
    let (engine, mut session) = session(&[], "stub://coco");

    match session.start() {
        Err(SessionError::Camera(CameraError::NoDevice)) => {}
        other => panic!("expected NoDevice, got {:?}", other.err()),
    }

    assert_eq!(session.state(), SessionState::Stopped);
    assert!(!session.sampler_active());
    assert!(!session.is_camera_running());
    assert!(engine.utterances().is_empty());

    // Recovery is user-initiated: the next start fails the same way.
    assert!(session.start().is_err());
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn model_load_failure_rolls_back_the_stream() {
    let (_engine, mut session) = session(&["cam"], "ftp://nowhere");

    match session.start() {
        Err(SessionError::ModelLoad(_)) => {}
        other => panic!("expected ModelLoad, got {:?}", other.err()),
    }

    assert_eq!(session.state(), SessionState::Stopped);
    assert!(!session.is_camera_running());
    assert!(!session.sampler_active());
}

#[test]
fn switch_flips_facing_while_running() {
    let (_engine, mut session) = session(&["Front Camera", "Back Camera"], "stub://coco");

    session.start().expect("start");
    let before = session.facing();
    session.switch_camera().expect("switch");

    assert_ne!(session.facing(), before);
    assert_eq!(session.state(), SessionState::Running);
    assert!(session.is_camera_running());

    session.stop();
}

#[test]
fn shutdown_is_exactly_once_and_idempotent() {
    let (engine, mut session) = session(&["cam"], "scripted://cup");

    session.start().expect("start");
    std::thread::sleep(Duration::from_millis(50));

    session.shutdown();
    assert_eq!(session.state(), SessionState::Stopped);
    let cancellations = engine.cancellations();

    // Further shutdowns (and the Drop backstop) do not re-run teardown.
    session.shutdown();
    assert_eq!(engine.cancellations(), cancellations);
    drop(session);
    assert_eq!(engine.cancellations(), cancellations);
}
