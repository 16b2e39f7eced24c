use std::sync::Arc;

use anyhow::Result;

use crate::detect::backends::{ScriptedModel, StubModel};
use crate::detect::result::DetectionFrameResult;
use crate::error::ModelLoadError;
use crate::media::VideoFrame;

/// Object-detection model capability.
///
/// The model is an external collaborator: given a video frame it returns the
/// recognized objects. Model internals, training, and accuracy are out of
/// scope; implementations only have to honor the result contract.
///
/// `detect` may take arbitrarily long. The sampler serializes calls, so
/// implementations are never invoked concurrently for one session.
pub trait ObjectModel: Send + Sync {
    /// Model identifier, for logs and status output.
    fn name(&self) -> &str;

    /// Run detection on one frame.
    fn detect(&self, frame: &VideoFrame) -> Result<DetectionFrameResult>;
}

/// Load a model from a URL, dispatching on scheme.
///
/// - `stub://<name>` - deterministic synthetic detector
/// - `scripted://<class>,<class>,...` - replays one class per call
///   (`-` for an empty frame), then reports empty frames forever
/// - `*.onnx` path - tract ONNX detector (feature `model-tract`)
///
/// Loading may take arbitrarily long; callers run it off the command path.
pub fn load_model(url: &str) -> Result<Arc<dyn ObjectModel>, ModelLoadError> {
    if let Some(name) = url.strip_prefix("stub://") {
        return Ok(Arc::new(StubModel::new(name)));
    }
    if let Some(script) = url.strip_prefix("scripted://") {
        return Ok(Arc::new(ScriptedModel::from_script(script)));
    }
    if url.ends_with(".onnx") {
        #[cfg(feature = "model-tract")]
        {
            let model = crate::detect::backends::TractModel::load(url)
                .map_err(ModelLoadError::from)?;
            return Ok(Arc::new(model));
        }
        #[cfg(not(feature = "model-tract"))]
        {
            return Err(ModelLoadError::from(anyhow::anyhow!(
                "ONNX models require the model-tract feature"
            )));
        }
    }
    Err(ModelLoadError::from(anyhow::anyhow!(
        "unsupported model URL '{}'",
        url
    )))
}
