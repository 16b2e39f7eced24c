//! Media capture: devices, streams, and camera lifecycle.
//!
//! This module owns the capture side of the perception loop:
//! - `MediaDevices`: the opaque enumeration/acquisition capability
//! - `MediaStream` / `Track` / `VideoSink`: stream plumbing
//! - `VideoSource`: the frame-producing view the sampler reads
//! - `CameraController`: start/stop/switch with explicit handover order
//!
//! Device hosts:
//! - Synthetic (`stub://`, tests and default config)
//! - V4L2 (feature: media-v4l2)
//!
//! The camera layer MUST NOT retry acquisition on its own: every failure
//! is surfaced once and recovery stays user-initiated.

mod camera;
mod devices;
mod stream;
mod synthetic;

#[cfg(feature = "media-v4l2")]
mod v4l2;

pub use camera::{CameraController, CameraFacing, CaptureSettings};
pub use devices::{open_devices, DeviceInfo, DeviceKind, MediaDevices, StreamConstraints};
pub use stream::{MediaStream, Track, VideoFrame, VideoSink, VideoSource};
pub use synthetic::SyntheticDevices;

#[cfg(feature = "media-v4l2")]
pub use v4l2::V4l2Devices;
