//! SightGuide assistive-perception client.
//!
//! This crate implements the control loop of a real-time assistive client:
//! it samples a live video feed, runs object detection on each frame,
//! renders bounding boxes, and announces newly-recognized object classes
//! via synthesized speech, for users who cannot see the scene themselves.
//!
//! The model, the capture subsystem, the drawing surface, and the speech
//! engine are all opaque capabilities consumed through traits; the
//! interesting part is keeping the session consistent while those
//! unbounded-latency calls overlap with user commands.
//!
//! # Architecture
//!
//! The session is a tree of three components under one root:
//!
//! - [`AnnouncementGate`]: dedup memory between detection results and the
//!   speech engine
//! - [`DetectionSampler`]: the serialized periodic inference loop
//! - [`media::CameraController`]: device selection, stream acquisition,
//!   stream teardown
//! - [`SessionController`]: the root state machine (Stopped, Starting,
//!   Running) reacting to start/stop/switch and teardown
//!
//! Lifecycle invariants held by construction:
//!
//! 1. A sampler loop is active iff the session is Running.
//! 2. A live stream is bound iff the session is Running.
//! 3. At most one sampler loop ever exists per session.
//! 4. An inference result that lands after its session stopped is
//!    discarded, never announced.
//!
//! # Module Structure
//!
//! - `config`: layered runtime configuration (file + env)
//! - `detect`: model capability, detection results, backends
//! - `media`: devices, streams, camera lifecycle
//! - `render`: drawing-surface capability and the render step
//! - `speech`: speech-engine capability and backends
//! - `announce`: announcement gating
//! - `sampler`: the recurring inference loop
//! - `session`: the root controller
//! - `error`: the start-path error taxonomy

pub mod announce;
pub mod config;
pub mod detect;
pub mod error;
pub mod media;
pub mod render;
pub mod sampler;
pub mod session;
pub mod speech;

pub use announce::AnnouncementGate;
pub use config::SightguideConfig;
pub use detect::{load_model, Detection, DetectionFrameResult, ObjectModel};
pub use error::{CameraError, ModelLoadError, SessionError};
pub use media::{open_devices, CameraFacing, MediaDevices, VideoFrame, VideoSource};
pub use render::{draw_detections, DrawSurface, LogSurface, RecordingSurface};
pub use sampler::{DetectionSampler, SamplerHandle};
pub use session::{SessionController, SessionState};
pub use speech::{open_engine, LogSpeech, SpeechEngine, StubSpeech};
