//! Session orchestration.
//!
//! `SessionController` is the root state machine tying the camera, the
//! detection sampler, and the announcement gate to the user commands
//! (start, stop, switch camera) and to teardown. One controller exists
//! per client, constructed at mount and shut down exactly once at
//! unmount.
//!
//! State invariants:
//! - a sampler handle exists iff the state is `Running`
//! - a bound stream exists iff the state is `Running` (acquisition during
//!   a start attempt is rolled back before the attempt reports failure)
//! - at most one sampler is ever active; a stale handle is stopped before
//!   a new one is installed

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;

use crate::announce::AnnouncementGate;
use crate::config::SightguideConfig;
use crate::detect::{load_model, ObjectModel};
use crate::error::{ModelLoadError, SessionError};
use crate::media::{
    CameraController, CameraFacing, CaptureSettings, MediaDevices, VideoSink, VideoSource,
};
use crate::render::{draw_detections, DrawSurface};
use crate::sampler::{DetectionSampler, SamplerHandle};
use crate::speech::SpeechEngine;

/// Session lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No stream, no sampler, no pending speech.
    Stopped,
    /// Stream/model acquisition in flight.
    Starting,
    /// Stream bound, sampler active.
    Running,
}

/// Root controller for one perception session.
pub struct SessionController {
    state: SessionState,
    camera: CameraController,
    sink: VideoSink,
    model_url: String,
    model: Option<Arc<dyn ObjectModel>>,
    gate: Arc<AnnouncementGate>,
    surface: Arc<dyn DrawSurface>,
    sampler: DetectionSampler,
    handle: Option<SamplerHandle>,
    torn_down: bool,
}

impl SessionController {
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        engine: Arc<dyn SpeechEngine>,
        surface: Arc<dyn DrawSurface>,
        config: &SightguideConfig,
    ) -> Self {
        let sink = VideoSink::new();
        let camera = CameraController::new(
            devices,
            sink.clone(),
            config.camera.facing,
            CaptureSettings {
                width: config.camera.width,
                height: config.camera.height,
                fps: config.camera.fps,
            },
        );
        let gate = Arc::new(
            AnnouncementGate::new(engine)
                .with_interrupt_on_clear(config.speech.interrupt_on_clear),
        );

        Self {
            state: SessionState::Stopped,
            camera,
            sink,
            model_url: config.model.url.clone(),
            model: None,
            gate,
            surface,
            sampler: DetectionSampler::new(Duration::from_millis(config.sampler.tick_ms)),
            handle: None,
            torn_down: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while a bound stream is live; gates the switch control.
    pub fn is_camera_running(&self) -> bool {
        self.camera.is_streaming()
    }

    pub fn facing(&self) -> CameraFacing {
        self.camera.facing()
    }

    /// The class most recently announced, if any.
    pub fn last_announced(&self) -> Option<String> {
        self.gate.last_announced()
    }

    /// Whether the polling loop is installed. Holds iff `Running`.
    pub fn sampler_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Start the session: acquire the stream and load the model (once per
    /// controller lifetime) concurrently, then install the sampler.
    ///
    /// On failure the attempt is aborted, resources return to their
    /// pre-attempt state (no half-acquired stream), and the state is back
    /// at `Stopped`. Never retried here; recovery is another start.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Stopped {
            log::debug!("session: start ignored in state {:?}", self.state);
            return Ok(());
        }
        self.state = SessionState::Starting;
        log::info!("session: starting ({} facing)", self.camera.facing());

        // Camera acquisition and model load are both unbounded-latency
        // external calls; run them concurrently and join both.
        let facing = self.camera.facing();
        let load_url = self.model.is_none().then(|| self.model_url.clone());
        let camera = &mut self.camera;
        let (camera_result, model_result) = std::thread::scope(|scope| {
            let loader =
                load_url.map(|url| scope.spawn(move || load_model(&url)));
            let camera_result = camera.start(facing);
            let model_result = loader.map(|join| {
                join.join().unwrap_or_else(|_| {
                    Err(ModelLoadError::from(anyhow!("model loader thread panicked")))
                })
            });
            (camera_result, model_result)
        });

        // A successfully loaded model outlives a failed attempt; only the
        // stream is rolled back to the pre-attempt state.
        let model_err = match model_result {
            Some(Ok(model)) => {
                log::info!("session: model '{}' loaded", model.name());
                self.model = Some(model);
                None
            }
            Some(Err(err)) => Some(err),
            None => None,
        };

        if let Err(err) = camera_result {
            self.state = SessionState::Stopped;
            log::error!("session: {err}");
            return Err(err.into());
        }
        if let Some(err) = model_err {
            self.camera.stop();
            self.state = SessionState::Stopped;
            log::error!("session: {err}");
            return Err(err.into());
        }

        let Some(model) = self.model.clone() else {
            self.camera.stop();
            self.state = SessionState::Stopped;
            let err = ModelLoadError::from(anyhow!("model unavailable after load"));
            return Err(err.into());
        };

        self.install_sampler(model);
        self.state = SessionState::Running;
        log::info!("session: running");
        Ok(())
    }

    /// Stop the session. Teardown order matters: sampler first so no tick
    /// can observe a torn-down source, then the stream, then the gate.
    /// A stop while already stopped is a no-op.
    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }

        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
        self.camera.stop();
        self.gate.reset();
        self.state = SessionState::Stopped;
        log::info!("session: stopped");
    }

    /// Flip to the opposite camera. State is unchanged; without a live
    /// stream this is a no-op rather than an error.
    pub fn switch_camera(&mut self) -> Result<(), SessionError> {
        if !self.is_camera_running() {
            log::debug!("session: switch ignored without a live stream");
            return Ok(());
        }
        self.camera.switch()?;
        log::info!("session: switched to {} facing", self.camera.facing());
        Ok(())
    }

    /// Tear the session down. Runs the stop sequence exactly once; later
    /// calls (including the `Drop` backstop) are no-ops.
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.stop();
        log::info!("session: shut down");
    }

    fn install_sampler(&mut self, model: Arc<dyn ObjectModel>) {
        // One sampler per session: retire any stale handle first.
        if let Some(mut stale) = self.handle.take() {
            stale.stop();
        }

        let gate = self.gate.clone();
        let draw_surface = self.surface.clone();
        let source: Arc<dyn VideoSource> = Arc::new(self.sink.clone());

        let handle = self.sampler.begin(
            model,
            source,
            self.surface.clone(),
            move |result| {
                draw_detections(draw_surface.as_ref(), result);
                gate.on_result(result);
            },
        );
        self.handle = Some(handle);
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
