use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::media::devices::{DeviceInfo, DeviceKind, MediaDevices, StreamConstraints};
use crate::media::stream::{MediaStream, Track, VideoFrame, VideoSource};

/// Synthetic device host (`stub://`) for tests, demos, and the default
/// daemon configuration.
///
/// Device labels come from the URL; `stub://none` models a machine with no
/// capture hardware at all, which is how the no-device start path is
/// exercised end to end.
pub struct SyntheticDevices {
    devices: Vec<DeviceInfo>,
    width: u32,
    height: u32,
}

impl SyntheticDevices {
    pub fn new(labels: &[&str], width: u32, height: u32) -> Self {
        let devices = labels
            .iter()
            .enumerate()
            .map(|(index, label)| DeviceInfo {
                kind: DeviceKind::VideoInput,
                label: label.to_string(),
                id: format!("cam{index}"),
            })
            .collect();
        Self {
            devices,
            width,
            height,
        }
    }

    /// Host with zero capture devices.
    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(&[], width, height)
    }

    /// Parse the label list of a `stub://` URL.
    pub fn from_labels(labels: &str, width: u32, height: u32) -> Self {
        if labels.is_empty() || labels == "none" {
            return Self::empty(width, height);
        }
        let labels: Vec<&str> = labels
            .split(',')
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .collect();
        Self::new(&labels, width, height)
    }
}

impl MediaDevices for SyntheticDevices {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        Ok(self.devices.clone())
    }

    fn open_stream(&self, constraints: &StreamConstraints) -> Result<MediaStream> {
        let device = match &constraints.device_id {
            Some(id) => self
                .devices
                .iter()
                .find(|device| &device.id == id)
                .ok_or_else(|| anyhow!("device '{}' not present", id))?,
            // Generic facing request: any video input satisfies it.
            None => self
                .devices
                .iter()
                .find(|device| device.is_video_input())
                .ok_or_else(|| anyhow!("no video input satisfies the constraints"))?,
        };

        log::info!(
            "SyntheticDevices: opened {} ({}, facing {})",
            device.id,
            device.label,
            constraints.facing
        );

        let source = SyntheticVideoSource::new(self.width, self.height);
        let track = Track::new(format!("{}-video", device.id), device.label.clone());
        Ok(MediaStream::new(vec![track], Arc::new(source)))
    }
}

/// Synthetic frame source: always ready, generates a drifting pattern so
/// consecutive frames differ.
struct SyntheticVideoSource {
    width: u32,
    height: u32,
    frame_count: AtomicU64,
}

impl SyntheticVideoSource {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame_count: AtomicU64::new(0),
        }
    }
}

impl VideoSource for SyntheticVideoSource {
    fn is_ready(&self) -> bool {
        true
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn capture_frame(&self) -> Result<VideoFrame> {
        let frame_count = self.frame_count.fetch_add(1, Ordering::SeqCst);
        let pixel_count = (self.width * self.height * 3) as usize;

        // Intentionally simple: position plus frame count, wrapped to a byte.
        let mut data = vec![0u8; pixel_count];
        for (i, pixel) in data.iter_mut().enumerate() {
            *pixel = ((i as u64 + frame_count) % 256) as u8;
        }

        Ok(VideoFrame {
            data,
            width: self.width,
            height: self.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::camera::CameraFacing;

    fn constraints() -> StreamConstraints {
        StreamConstraints {
            device_id: None,
            facing: CameraFacing::Rear,
            width: 64,
            height: 48,
            fps: 30,
        }
    }

    #[test]
    fn from_labels_parses_none_as_empty() -> Result<()> {
        let host = SyntheticDevices::from_labels("none", 64, 48);
        assert!(host.enumerate()?.is_empty());
        Ok(())
    }

    #[test]
    fn open_stream_honors_exact_device_id() -> Result<()> {
        let host = SyntheticDevices::new(&["front cam", "back cam"], 64, 48);
        let mut wanted = constraints();
        wanted.device_id = Some("cam1".to_string());

        let stream = host.open_stream(&wanted)?;
        assert_eq!(stream.tracks().len(), 1);
        assert_eq!(stream.tracks()[0].label(), "back cam");
        Ok(())
    }

    #[test]
    fn open_stream_fails_for_unknown_device() {
        let host = SyntheticDevices::new(&["front cam"], 64, 48);
        let mut wanted = constraints();
        wanted.device_id = Some("cam9".to_string());
        assert!(host.open_stream(&wanted).is_err());
    }

    #[test]
    fn synthetic_frames_drift_between_captures() -> Result<()> {
        let host = SyntheticDevices::new(&["front cam"], 8, 8);
        let stream = host.open_stream(&constraints())?;

        let first = stream.capture_frame()?;
        let second = stream.capture_frame()?;
        assert_eq!(first.width, 8);
        assert_ne!(first.data, second.data);
        Ok(())
    }
}
