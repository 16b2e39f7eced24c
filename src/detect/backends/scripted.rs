use std::sync::Mutex;

use anyhow::Result;

use crate::detect::model::ObjectModel;
use crate::detect::result::{BoundingBox, Detection, DetectionFrameResult};
use crate::media::VideoFrame;

/// Scripted model: replays a fixed sequence of per-call results.
///
/// Each `detect` call consumes the next entry; once the script is exhausted
/// every further call reports an empty frame. Entry syntax (for
/// `scripted://` URLs): comma-separated ticks, `+` joining classes within
/// one tick, `-` for an empty tick, e.g. `person,person+dog,-,cup`.
pub struct ScriptedModel {
    script: Mutex<std::vec::IntoIter<Vec<String>>>,
}

impl ScriptedModel {
    pub fn new(ticks: Vec<Vec<String>>) -> Self {
        Self {
            script: Mutex::new(ticks.into_iter()),
        }
    }

    pub fn from_script(script: &str) -> Self {
        let ticks = script
            .split(',')
            .map(|tick| {
                let tick = tick.trim();
                if tick.is_empty() || tick == "-" {
                    Vec::new()
                } else {
                    tick.split('+').map(|class| class.trim().to_string()).collect()
                }
            })
            .collect();
        Self::new(ticks)
    }
}

impl ObjectModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn detect(&self, frame: &VideoFrame) -> Result<DetectionFrameResult> {
        let next = match self.script.lock() {
            Ok(mut script) => script.next(),
            Err(_) => None,
        };
        let Some(classes) = next else {
            return Ok(DetectionFrameResult::empty());
        };

        let width = frame.width as f32;
        let height = frame.height as f32;
        let detections = classes
            .into_iter()
            .enumerate()
            .map(|(index, class)| Detection {
                class,
                confidence: 0.9,
                bbox: BoundingBox {
                    x: index as f32 * 10.0,
                    y: index as f32 * 10.0,
                    width: (width / 2.0).max(1.0),
                    height: (height / 2.0).max(1.0),
                },
            })
            .collect();

        Ok(DetectionFrameResult { detections })
    }
}
