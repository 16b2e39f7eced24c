//! Object-detection capability.
//!
//! This module provides the model side of the perception loop:
//! - `ObjectModel`: the opaque detection capability
//! - `Detection` / `DetectionFrameResult`: per-frame results
//! - `load_model`: URL-scheme dispatch to a backend
//!
//! Backends:
//! - Stub (deterministic, `stub://`, default)
//! - Scripted (replays class sequences, `scripted://`, tests and demos)
//! - Tract ONNX (feature: model-tract)

mod backends;
mod model;
mod result;

pub use backends::{ScriptedModel, StubModel};
pub use model::{load_model, ObjectModel};
pub use result::{BoundingBox, Detection, DetectionFrameResult};

#[cfg(feature = "model-tract")]
pub use backends::TractModel;
