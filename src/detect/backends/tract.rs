#![cfg(feature = "model-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::model::ObjectModel;
use crate::detect::result::{BoundingBox, Detection, DetectionFrameResult};
use crate::media::VideoFrame;

/// Standard COCO label set, indexed by class id.
const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

/// Tract-based ONNX model.
///
/// Loads a local classification-style model and maps its best-scoring class
/// onto a single full-frame detection. Frames are letterbox-free: they must
/// already match the model input size.
pub struct TractModel {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    input_width: u32,
    input_height: u32,
    confidence_threshold: f32,
    label: String,
}

impl TractModel {
    /// Load an ONNX model from disk and prepare it for inference.
    ///
    /// The input is fixed at 1x3x`height`x`width` f32, NCHW.
    pub fn new<P: AsRef<Path>>(model_path: P, width: u32, height: u32) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            input_width: width,
            input_height: height,
            confidence_threshold: 0.5,
            label: model_path.display().to_string(),
        })
    }

    /// Load with the default 640x480 input geometry used by the capture layer.
    pub fn load(path: &str) -> Result<Self> {
        Self::new(path, 640, 480)
    }

    /// Override the default confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    fn build_input(&self, frame: &VideoFrame) -> Result<Tensor> {
        if frame.width != self.input_width || frame.height != self.input_height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                frame.width,
                frame.height,
                self.input_width,
                self.input_height
            ));
        }

        let expected_len = (frame.width as usize)
            .checked_mul(frame.height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if frame.data.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                frame.data.len()
            ));
        }

        let width = frame.width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, frame.height as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                frame.data[idx] as f32 / 255.0
            },
        );

        Ok(input.into_tensor())
    }

    fn best_class(&self, outputs: TVec<TValue>) -> Result<Option<(usize, f32)>> {
        let output = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let scores = output
            .to_array_view::<f32>()
            .context("model output tensor was not f32")?;

        let mut best: Option<(usize, f32)> = None;
        for (index, &score) in scores.iter().enumerate() {
            if score.is_finite() && best.map(|(_, s)| score > s).unwrap_or(true) {
                best = Some((index, score));
            }
        }
        Ok(best)
    }
}

impl ObjectModel for TractModel {
    fn name(&self) -> &str {
        &self.label
    }

    fn detect(&self, frame: &VideoFrame) -> Result<DetectionFrameResult> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;

        let Some((class_id, score)) = self.best_class(outputs)? else {
            return Ok(DetectionFrameResult::empty());
        };
        if score < self.confidence_threshold {
            return Ok(DetectionFrameResult::empty());
        }

        let class = COCO_CLASSES
            .get(class_id)
            .copied()
            .unwrap_or("unknown")
            .to_string();
        let detection = Detection {
            class,
            confidence: score.clamp(0.0, 1.0),
            bbox: BoundingBox {
                x: 0.0,
                y: 0.0,
                width: frame.width as f32,
                height: frame.height as f32,
            },
        };
        Ok(DetectionFrameResult::from(vec![detection]))
    }
}
