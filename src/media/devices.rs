use std::sync::Arc;

use anyhow::Result;

use crate::media::camera::CameraFacing;
use crate::media::stream::MediaStream;
use crate::media::synthetic::SyntheticDevices;

/// Kind of capture device, as reported by enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
}

/// One enumerated capture device.
#[derive(Clone, Debug)]
pub struct DeviceInfo {
    pub kind: DeviceKind,
    pub label: String,
    pub id: String,
}

impl DeviceInfo {
    pub fn is_video_input(&self) -> bool {
        self.kind == DeviceKind::VideoInput
    }
}

/// Constraints for a stream-acquisition request.
///
/// `device_id` is an exact-device request and takes precedence over the
/// generic facing hint when the host honors it.
#[derive(Clone, Debug)]
pub struct StreamConstraints {
    pub device_id: Option<String>,
    pub facing: CameraFacing,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

/// Media-capture subsystem capability.
///
/// Both calls are external and unbounded-latency; neither is retried by
/// this crate. Acquisition failures (permission denied, device busy) come
/// back as errors for the camera controller to classify.
pub trait MediaDevices: Send + Sync {
    /// List available capture devices.
    fn enumerate(&self) -> Result<Vec<DeviceInfo>>;

    /// Acquire a live stream satisfying the constraints.
    fn open_stream(&self, constraints: &StreamConstraints) -> Result<MediaStream>;
}

/// Open a device host from a URL, dispatching on scheme.
///
/// - `stub://<label>,<label>,...` - synthetic cameras with those labels
/// - `stub://none` - a host with zero capture devices
/// - `v4l2://` - local V4L2 devices (feature `media-v4l2`)
pub fn open_devices(url: &str, width: u32, height: u32) -> Result<Arc<dyn MediaDevices>> {
    if let Some(labels) = url.strip_prefix("stub://") {
        return Ok(Arc::new(SyntheticDevices::from_labels(labels, width, height)));
    }
    if url.starts_with("v4l2://") {
        #[cfg(feature = "media-v4l2")]
        {
            return Ok(Arc::new(crate::media::v4l2::V4l2Devices::new(width, height)));
        }
        #[cfg(not(feature = "media-v4l2"))]
        {
            anyhow::bail!("v4l2 device host requires the media-v4l2 feature");
        }
    }
    anyhow::bail!("unsupported devices URL '{}'", url)
}
