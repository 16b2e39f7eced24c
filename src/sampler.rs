//! Detection sampling loop.
//!
//! Repeatedly captures a frame from the bound video source and runs
//! inference, at a fixed cadence, only while active. Ticks are serialized:
//! the loop runs one inference to completion before the next tick fires,
//! so at most one detect call is ever in flight per session. Missed tick
//! deadlines are skipped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::detect::{DetectionFrameResult, ObjectModel};
use crate::media::VideoSource;
use crate::render::DrawSurface;

/// Default tick period. Far shorter than plausible inference latency; the
/// serialized loop is what bounds the actual rate.
pub const DEFAULT_TICK_MS: u64 = 10;

/// Drives the recurring detect-and-forward step.
pub struct DetectionSampler {
    tick: Duration,
}

impl DetectionSampler {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// Start the recurring inference loop against `source` and `model`.
    ///
    /// Each tick: a source that is not producing decodable frames is a
    /// silent no-op; otherwise the frame dimensions are propagated to the
    /// surface, the model runs, and the result reaches `on_result`.
    /// Inference failures are logged and dropped; they never end the loop.
    pub fn begin(
        &self,
        model: Arc<dyn ObjectModel>,
        source: Arc<dyn VideoSource>,
        surface: Arc<dyn DrawSurface>,
        on_result: impl Fn(&DetectionFrameResult) + Send + 'static,
    ) -> SamplerHandle {
        let shutdown = Arc::new(AtomicBool::new(false));
        let tick = self.tick;
        let loop_shutdown = shutdown.clone();

        let join = std::thread::spawn(move || {
            run_loop(tick, model, source, surface, on_result, loop_shutdown);
        });

        SamplerHandle {
            shutdown,
            join: Some(join),
        }
    }
}

/// Handle to a running sampling loop.
///
/// Exists iff the session is Running; stopping it guarantees no further
/// `on_result` invocations once `stop` returns.
pub struct SamplerHandle {
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    /// Cancel the recurring schedule and wait for the loop to exit.
    /// Idempotent.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::error!("sampler thread panicked");
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.join.is_some()
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_loop(
    tick: Duration,
    model: Arc<dyn ObjectModel>,
    source: Arc<dyn VideoSource>,
    surface: Arc<dyn DrawSurface>,
    on_result: impl Fn(&DetectionFrameResult),
    shutdown: Arc<AtomicBool>,
) {
    log::debug!("sampler: loop started ({:?} tick)", tick);
    let mut next_tick = Instant::now();

    loop {
        let now = Instant::now();
        if next_tick > now {
            std::thread::sleep(next_tick - now);
        } else {
            // Inference outran the cadence; skip the missed deadlines.
            next_tick = now;
        }
        next_tick += tick;

        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        // Source not yet decoding frames: silent no-op, not an error.
        if !source.is_ready() {
            continue;
        }

        let (width, height) = source.dimensions();
        surface.set_size(width, height);

        let frame = match source.capture_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("sampler: frame capture failed, skipping tick: {err:#}");
                continue;
            }
        };

        match model.detect(&frame) {
            Ok(result) => {
                // The session may have stopped while inference was in
                // flight; a late result must be discarded, not forwarded.
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                on_result(&result);
            }
            Err(err) => {
                log::warn!("sampler: inference failed, dropping tick: {err:#}");
            }
        }
    }

    log::debug!("sampler: loop stopped");
}
