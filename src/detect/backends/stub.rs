use anyhow::Result;

use crate::detect::model::ObjectModel;
use crate::detect::result::{BoundingBox, Detection, DetectionFrameResult};
use crate::media::VideoFrame;

/// Class table the stub cycles through. Drawn from the label set of the
/// kind of COCO-trained detector this client is normally paired with.
const STUB_CLASSES: &[&str] = &["person", "chair", "cup", "bottle", "dog"];

/// Stub model for testing and the default daemon configuration.
///
/// Derives a detection deterministically from frame content: the mean
/// luminance of the frame selects a class, and the box is centered at half
/// the frame size. Identical frames always produce identical results.
pub struct StubModel {
    label: String,
}

impl StubModel {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl ObjectModel for StubModel {
    fn name(&self) -> &str {
        &self.label
    }

    fn detect(&self, frame: &VideoFrame) -> Result<DetectionFrameResult> {
        if frame.data.is_empty() {
            return Ok(DetectionFrameResult::empty());
        }

        let sum: u64 = frame.data.iter().map(|&b| b as u64).sum();
        let mean = (sum / frame.data.len() as u64) as usize;
        let class = STUB_CLASSES[mean % STUB_CLASSES.len()];

        let width = frame.width as f32;
        let height = frame.height as f32;
        let detection = Detection {
            class: class.to_string(),
            confidence: 0.85,
            bbox: BoundingBox {
                x: width / 4.0,
                y: height / 4.0,
                width: width / 2.0,
                height: height / 2.0,
            },
        };

        Ok(DetectionFrameResult::from(vec![detection]))
    }
}
