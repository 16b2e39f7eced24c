//! Rendering adapter.
//!
//! The drawing surface is an external collaborator; this module only
//! defines the capability trait and the one render step that turns a
//! `DetectionFrameResult` into draw calls. Detection and rendering are
//! connected by the result value alone, so announcement logic and drawing
//! are testable in isolation.

use std::sync::Mutex;

use crate::detect::DetectionFrameResult;

/// Label font used for class captions.
pub const LABEL_FONT: &str = "18px Arial";

/// Stroke palette for class boxes; a class hashes to a stable entry.
const STROKE_COLORS: &[&str] = &[
    "#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
];

/// 2D drawing surface capability: primitive draw commands only.
pub trait DrawSurface: Send + Sync {
    /// Propagate the frame dimensions as the surface target size.
    fn set_size(&self, width: u32, height: u32);

    fn draw_rect(&self, x: f32, y: f32, width: f32, height: f32, stroke: &str);

    fn draw_text(&self, text: &str, x: f32, y: f32, font: &str);
}

/// Stable per-class stroke color.
pub fn class_color(class: &str) -> &'static str {
    let hash: usize = class.bytes().fold(0usize, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(b as usize)
    });
    STROKE_COLORS[hash % STROKE_COLORS.len()]
}

/// Draw one frame's detections: caption first, then the box, per detection.
pub fn draw_detections(surface: &dyn DrawSurface, result: &DetectionFrameResult) {
    for detection in &result.detections {
        let bbox = &detection.bbox;
        let color = class_color(&detection.class);
        surface.draw_text(&detection.class, bbox.x, bbox.y, LABEL_FONT);
        surface.draw_rect(bbox.x, bbox.y, bbox.width, bbox.height, color);
    }
}

/// Surface that logs draw calls; the daemon's default stand-in for a real
/// drawing backend.
#[derive(Default)]
pub struct LogSurface;

impl DrawSurface for LogSurface {
    fn set_size(&self, width: u32, height: u32) {
        log::trace!("surface size {}x{}", width, height);
    }

    fn draw_rect(&self, x: f32, y: f32, width: f32, height: f32, stroke: &str) {
        log::debug!(
            "draw rect ({:.0},{:.0}) {:.0}x{:.0} stroke {}",
            x,
            y,
            width,
            height,
            stroke
        );
    }

    fn draw_text(&self, text: &str, x: f32, y: f32, _font: &str) {
        log::debug!("draw text '{}' at ({:.0},{:.0})", text, x, y);
    }
}

/// One recorded draw call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    SetSize { width: u32, height: u32 },
    Rect { x: f32, y: f32, width: f32, height: f32, stroke: String },
    Text { text: String, x: f32, y: f32, font: String },
}

/// Surface that records calls for assertions.
#[derive(Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<DrawCall>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DrawCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn push(&self, call: DrawCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl DrawSurface for RecordingSurface {
    fn set_size(&self, width: u32, height: u32) {
        self.push(DrawCall::SetSize { width, height });
    }

    fn draw_rect(&self, x: f32, y: f32, width: f32, height: f32, stroke: &str) {
        self.push(DrawCall::Rect {
            x,
            y,
            width,
            height,
            stroke: stroke.to_string(),
        });
    }

    fn draw_text(&self, text: &str, x: f32, y: f32, font: &str) {
        self.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            font: font.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, Detection};

    fn result(classes: &[&str]) -> DetectionFrameResult {
        DetectionFrameResult::from(
            classes
                .iter()
                .map(|class| Detection {
                    class: class.to_string(),
                    confidence: 0.9,
                    bbox: BoundingBox {
                        x: 10.0,
                        y: 20.0,
                        width: 100.0,
                        height: 50.0,
                    },
                })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn draws_caption_then_box_per_detection() {
        let surface = RecordingSurface::new();
        draw_detections(&surface, &result(&["cup", "dog"]));

        let calls = surface.calls();
        assert_eq!(calls.len(), 4);
        assert!(matches!(&calls[0], DrawCall::Text { text, font, .. }
            if text == "cup" && font == LABEL_FONT));
        assert!(matches!(&calls[1], DrawCall::Rect { .. }));
        assert!(matches!(&calls[2], DrawCall::Text { text, .. } if text == "dog"));
    }

    #[test]
    fn empty_result_draws_nothing() {
        let surface = RecordingSurface::new();
        draw_detections(&surface, &DetectionFrameResult::empty());
        assert!(surface.calls().is_empty());
    }

    #[test]
    fn class_color_is_stable() {
        assert_eq!(class_color("person"), class_color("person"));
    }
}
