use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;

use crate::error::CameraError;
use crate::media::devices::{MediaDevices, StreamConstraints};
use crate::media::stream::VideoSink;

/// Which physical camera is requested. Exactly one facing is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraFacing {
    Front,
    Rear,
}

impl CameraFacing {
    pub fn opposite(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Rear,
            CameraFacing::Rear => CameraFacing::Front,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CameraFacing::Front => "front",
            CameraFacing::Rear => "rear",
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraFacing {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(CameraFacing::Front),
            "rear" | "back" | "environment" => Ok(CameraFacing::Rear),
            other => Err(anyhow!("unknown camera facing '{}'", other)),
        }
    }
}

/// Stream geometry requested from the device host.
#[derive(Clone, Copy, Debug)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

/// Owns acquisition and teardown of the live capture stream.
///
/// Handover order on (re)start: acquire the NEW stream, stop the old
/// stream's tracks, then bind the new stream to the sink. A failed
/// acquisition therefore leaves the previous stream untouched and live.
pub struct CameraController {
    devices: Arc<dyn MediaDevices>,
    sink: VideoSink,
    facing: CameraFacing,
    settings: CaptureSettings,
}

impl CameraController {
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        sink: VideoSink,
        facing: CameraFacing,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            devices,
            sink,
            facing,
            settings,
        }
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    /// True while a bound stream is live and decoding.
    pub fn is_streaming(&self) -> bool {
        self.sink.is_streaming()
    }

    /// Acquire a stream for `facing` and bind it to the sink.
    ///
    /// Errors are surfaced for user notification and never retried here.
    pub fn start(&mut self, facing: CameraFacing) -> Result<(), CameraError> {
        let devices = self
            .devices
            .enumerate()
            .map_err(CameraError::Acquisition)?;

        if !devices.iter().any(|device| device.is_video_input()) {
            log::error!("CameraController: no capture devices available");
            return Err(CameraError::NoDevice);
        }

        // Rear-facing heuristic: a video input labelled "back" gets an
        // exact-device request; otherwise ask generically by facing.
        let device_id = match facing {
            CameraFacing::Rear => devices
                .iter()
                .find(|device| {
                    device.is_video_input() && device.label.to_lowercase().contains("back")
                })
                .map(|device| device.id.clone()),
            CameraFacing::Front => None,
        };
        log::debug!(
            "CameraController: requesting facing {} (exact device: {:?})",
            facing,
            device_id
        );

        let constraints = StreamConstraints {
            device_id,
            facing,
            width: self.settings.width,
            height: self.settings.height,
            fps: self.settings.fps,
        };
        let stream = self
            .devices
            .open_stream(&constraints)
            .map_err(CameraError::Acquisition)?;

        // New stream is live: retire the old one, then hand over the sink.
        if let Some(old) = self.sink.take() {
            old.stop_tracks();
        }
        self.sink.bind(stream);
        self.facing = facing;
        log::info!("CameraController: streaming ({} facing)", facing);
        Ok(())
    }

    /// Stop every track of the bound stream and clear the binding.
    /// Calling with nothing bound is a no-op.
    pub fn stop(&mut self) {
        if let Some(stream) = self.sink.take() {
            stream.stop_tracks();
            log::info!("CameraController: stream stopped");
        }
    }

    /// Acquire the opposite facing. The facing flips only on success.
    pub fn switch(&mut self) -> Result<(), CameraError> {
        self.start(self.facing.opposite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::synthetic::SyntheticDevices;
    use crate::media::VideoSource;

    fn controller(labels: &[&str]) -> CameraController {
        CameraController::new(
            Arc::new(SyntheticDevices::new(labels, 64, 48)),
            VideoSink::new(),
            CameraFacing::Rear,
            CaptureSettings::default(),
        )
    }

    #[test]
    fn start_with_no_devices_is_no_device_error() {
        let mut camera = controller(&[]);
        match camera.start(CameraFacing::Rear) {
            Err(CameraError::NoDevice) => {}
            other => panic!("expected NoDevice, got {:?}", other.err()),
        }
        assert!(!camera.is_streaming());
    }

    #[test]
    fn start_prefers_back_labelled_device_for_rear() -> anyhow::Result<()> {
        let sink = VideoSink::new();
        let mut camera = CameraController::new(
            Arc::new(SyntheticDevices::new(&["Front Camera", "Back Camera"], 64, 48)),
            sink.clone(),
            CameraFacing::Rear,
            CaptureSettings::default(),
        );

        camera.start(CameraFacing::Rear)?;
        assert!(camera.is_streaming());

        let bound = sink.take().ok_or_else(|| anyhow!("no stream bound"))?;
        assert_eq!(bound.tracks()[0].label(), "Back Camera");
        Ok(())
    }

    #[test]
    fn stop_is_idempotent() -> anyhow::Result<()> {
        let mut camera = controller(&["cam"]);
        camera.start(CameraFacing::Rear)?;
        camera.stop();
        assert!(!camera.is_streaming());
        camera.stop();
        Ok(())
    }

    #[test]
    fn switch_flips_facing_only_on_success() -> anyhow::Result<()> {
        let mut camera = controller(&["cam"]);
        camera.start(CameraFacing::Rear)?;
        camera.switch()?;
        assert_eq!(camera.facing(), CameraFacing::Front);

        // A host that stops enumerating leaves the facing untouched.
        let mut broken = CameraController::new(
            Arc::new(SyntheticDevices::empty(64, 48)),
            VideoSink::new(),
            CameraFacing::Front,
            CaptureSettings::default(),
        );
        assert!(broken.switch().is_err());
        assert_eq!(broken.facing(), CameraFacing::Front);
        Ok(())
    }

    /// Host whose first acquisition succeeds and every later one fails.
    struct OneShotDevices {
        inner: SyntheticDevices,
        opened: std::sync::atomic::AtomicBool,
    }

    impl MediaDevices for OneShotDevices {
        fn enumerate(&self) -> anyhow::Result<Vec<crate::media::DeviceInfo>> {
            self.inner.enumerate()
        }

        fn open_stream(&self, constraints: &StreamConstraints) -> anyhow::Result<crate::media::MediaStream> {
            if self
                .opened
                .swap(true, std::sync::atomic::Ordering::SeqCst)
            {
                anyhow::bail!("device busy");
            }
            self.inner.open_stream(constraints)
        }
    }

    #[test]
    fn failed_switch_leaves_old_stream_live() -> anyhow::Result<()> {
        let sink = VideoSink::new();
        let mut camera = CameraController::new(
            Arc::new(OneShotDevices {
                inner: SyntheticDevices::new(&["cam"], 64, 48),
                opened: std::sync::atomic::AtomicBool::new(false),
            }),
            sink.clone(),
            CameraFacing::Rear,
            CaptureSettings::default(),
        );
        camera.start(CameraFacing::Rear)?;

        match camera.switch() {
            Err(CameraError::Acquisition(_)) => {}
            other => panic!("expected Acquisition, got {:?}", other.err()),
        }
        assert!(sink.is_ready());
        assert_eq!(camera.facing(), CameraFacing::Rear);
        Ok(())
    }
}
