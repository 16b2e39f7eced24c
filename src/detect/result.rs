/// One recognized object instance in a frame.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Class label reported by the model (e.g. "person", "cup").
    pub class: String,
    /// Confidence in 0..1. Available to callers, not used for gating.
    pub confidence: f32,
    /// Bounding box in frame pixel coordinates.
    pub bbox: BoundingBox,
}

/// Axis-aligned bounding box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Result of one inference call: zero or more detections, model-ordered.
///
/// Produced fresh each call, never persisted. The ordering is significant
/// only for primary-detection selection; the first element is the
/// announcement candidate.
#[derive(Clone, Debug, Default)]
pub struct DetectionFrameResult {
    pub detections: Vec<Detection>,
}

impl DetectionFrameResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The primary detection: first element of the model-ordered sequence.
    pub fn primary(&self) -> Option<&Detection> {
        self.detections.first()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }
}

impl From<Vec<Detection>> for DetectionFrameResult {
    fn from(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}
