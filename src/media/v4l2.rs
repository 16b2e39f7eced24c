#![cfg(feature = "media-v4l2")]

//! V4L2 device host.
//!
//! Backs the media-capture capability with local V4L2 devices
//! (e.g. /dev/video0). Enumeration maps device nodes to `DeviceInfo`;
//! acquisition opens the node, negotiates RGB3 (decoding MJPG via `image`
//! when the driver insists on it), and exposes the mmap stream as a
//! `VideoSource`.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use crate::media::devices::{DeviceInfo, DeviceKind, MediaDevices, StreamConstraints};
use crate::media::stream::{MediaStream, Track, VideoFrame, VideoSource};

/// Local V4L2 device host.
pub struct V4l2Devices {
    width: u32,
    height: u32,
}

impl V4l2Devices {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl MediaDevices for V4l2Devices {
    fn enumerate(&self) -> Result<Vec<DeviceInfo>> {
        let nodes = v4l::context::enum_devices();
        let devices = nodes
            .iter()
            .map(|node| {
                let path = node.path().display().to_string();
                DeviceInfo {
                    kind: DeviceKind::VideoInput,
                    label: node.name().unwrap_or_else(|| path.clone()),
                    id: path,
                }
            })
            .collect();
        Ok(devices)
    }

    fn open_stream(&self, constraints: &StreamConstraints) -> Result<MediaStream> {
        let path = match &constraints.device_id {
            Some(id) => id.clone(),
            None => "/dev/video0".to_string(),
        };
        let width = if constraints.width > 0 {
            constraints.width
        } else {
            self.width
        };
        let height = if constraints.height > 0 {
            constraints.height
        } else {
            self.height
        };

        let source = V4l2VideoSource::open(&path, width, height, constraints.fps)?;
        let label = format!("V4L2 {}", path);
        let track = Track::new(format!("{path}-video"), label);
        Ok(MediaStream::new(vec![track], Arc::new(source)))
    }
}

#[self_referencing]
struct V4l2State {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

/// One opened V4L2 capture device exposed as a frame source.
struct V4l2VideoSource {
    state: Mutex<V4l2State>,
    width: u32,
    height: u32,
    fourcc: [u8; 4],
    path: String,
}

impl V4l2VideoSource {
    fn open(path: &str, width: u32, height: u32, fps: u32) -> Result<Self> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device =
            v4l::Device::with_path(path).with_context(|| format!("open v4l2 device {path}"))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = width;
        format.height = height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!("V4l2VideoSource: failed to set format on {}: {}", path, err);
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };

        if fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!("V4l2VideoSource: failed to set fps on {}: {}", path, err);
            }
        }

        let state = V4l2StateBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()?;

        log::info!(
            "V4l2VideoSource: connected to {} ({}x{}, {})",
            path,
            format.width,
            format.height,
            format.fourcc
        );

        Ok(Self {
            state: Mutex::new(state),
            width: format.width,
            height: format.height,
            fourcc: format.fourcc.repr,
            path: path.to_string(),
        })
    }

    fn decode(&self, buf: &[u8]) -> Result<Vec<u8>> {
        match &self.fourcc {
            b"RGB3" => Ok(buf.to_vec()),
            b"MJPG" | b"JPEG" => {
                let decoded = image::load_from_memory(buf)
                    .with_context(|| format!("decode MJPG frame from {}", self.path))?;
                Ok(decoded.into_rgb8().into_raw())
            }
            other => Err(anyhow!(
                "unsupported pixel format {} on {}",
                String::from_utf8_lossy(other),
                self.path
            )),
        }
    }
}

impl VideoSource for V4l2VideoSource {
    fn is_ready(&self) -> bool {
        true
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn capture_frame(&self) -> Result<VideoFrame> {
        use v4l::io::traits::CaptureStream;

        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow!("v4l2 stream lock poisoned"))?;
        let data = {
            let (buf, _meta) = state
                .with_mut(|fields| fields.stream.next())
                .context("capture v4l2 frame")?;
            self.decode(buf)?
        };

        Ok(VideoFrame {
            data,
            width: self.width,
            height: self.height,
        })
    }
}
