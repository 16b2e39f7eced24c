use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};

/// One decoded RGB24 frame. This is the opaque handle handed to
/// `ObjectModel::detect`; the control loop never inspects pixels itself.
#[derive(Clone, Debug)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Live video source capability.
///
/// A source that is not yet producing decodable frames reports
/// `is_ready() == false`; the sampler treats that as a silent no-op tick,
/// not an error.
pub trait VideoSource: Send + Sync {
    fn is_ready(&self) -> bool;

    /// Current frame dimensions in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Capture the current frame.
    fn capture_frame(&self) -> Result<VideoFrame>;
}

/// One constituent track of a media stream.
///
/// Stopping a track is terminal; a stream whose video tracks are all
/// stopped stops being ready even while it remains bound to the sink.
pub struct Track {
    id: String,
    label: String,
    live: Arc<AtomicBool>,
}

impl Track {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            log::debug!("Track {}: stopped", self.id);
        }
    }
}

/// An acquired capture stream: its tracks plus the frame source.
pub struct MediaStream {
    tracks: Vec<Track>,
    source: Arc<dyn VideoSource>,
}

impl MediaStream {
    pub fn new(tracks: Vec<Track>, source: Arc<dyn VideoSource>) -> Self {
        Self { tracks, source }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Stop every constituent track.
    pub fn stop_tracks(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    /// Ready iff at least one track is live and the source decodes frames.
    pub fn is_ready(&self) -> bool {
        self.tracks.iter().any(Track::is_live) && self.source.is_ready()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.source.dimensions()
    }

    pub fn capture_frame(&self) -> Result<VideoFrame> {
        self.source.capture_frame()
    }
}

/// The active video sink: the shared slot a stream is bound to.
///
/// The camera controller binds and clears it; the sampler reads through it
/// as a `VideoSource`. An unbound sink is simply "not ready" - ticks
/// against it are silent no-ops.
#[derive(Clone, Default)]
pub struct VideoSink {
    slot: Arc<Mutex<Option<MediaStream>>>,
}

impl VideoSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a stream, returning the displaced one (still un-stopped).
    pub fn bind(&self, stream: MediaStream) -> Option<MediaStream> {
        match self.slot.lock() {
            Ok(mut slot) => slot.replace(stream),
            Err(poisoned) => poisoned.into_inner().replace(stream),
        }
    }

    /// Unbind and return the current stream, if any.
    pub fn take(&self) -> Option<MediaStream> {
        match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn is_bound(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_some(),
            Err(_) => false,
        }
    }

    /// True when a bound stream has live tracks and decodable frames.
    pub fn is_streaming(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.as_ref().map(MediaStream::is_ready).unwrap_or(false),
            Err(_) => false,
        }
    }
}

impl VideoSource for VideoSink {
    fn is_ready(&self) -> bool {
        self.is_streaming()
    }

    fn dimensions(&self) -> (u32, u32) {
        match self.slot.lock() {
            Ok(slot) => slot
                .as_ref()
                .map(MediaStream::dimensions)
                .unwrap_or((0, 0)),
            Err(_) => (0, 0),
        }
    }

    fn capture_frame(&self) -> Result<VideoFrame> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| anyhow!("video sink lock poisoned"))?;
        match slot.as_ref() {
            Some(stream) => stream.capture_frame(),
            None => Err(anyhow!("no stream bound to the video sink")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource;

    impl VideoSource for FixedSource {
        fn is_ready(&self) -> bool {
            true
        }

        fn dimensions(&self) -> (u32, u32) {
            (4, 2)
        }

        fn capture_frame(&self) -> Result<VideoFrame> {
            Ok(VideoFrame {
                data: vec![0; 24],
                width: 4,
                height: 2,
            })
        }
    }

    fn stream() -> MediaStream {
        MediaStream::new(vec![Track::new("t0", "test cam")], Arc::new(FixedSource))
    }

    #[test]
    fn unbound_sink_is_not_ready() {
        let sink = VideoSink::new();
        assert!(!sink.is_ready());
        assert!(sink.capture_frame().is_err());
    }

    #[test]
    fn stopping_all_tracks_makes_stream_unready() {
        let sink = VideoSink::new();
        sink.bind(stream());
        assert!(sink.is_ready());

        if let Some(bound) = sink.take() {
            bound.stop_tracks();
            assert!(!bound.is_ready());
            sink.bind(bound);
        }
        assert!(sink.is_bound());
        assert!(!sink.is_ready());
    }

    #[test]
    fn bind_returns_displaced_stream() {
        let sink = VideoSink::new();
        assert!(sink.bind(stream()).is_none());
        let displaced = sink.bind(stream());
        assert!(displaced.is_some());
        assert!(displaced.map(|s| s.is_ready()).unwrap_or(false));
    }
}
