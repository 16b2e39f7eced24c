//! Error taxonomy for the session control loop.
//!
//! Start-attempt errors are typed because the session reacts differently
//! per variant (user-visible alert vs. logged abort); capability backends
//! keep the plain `anyhow` idiom internally. Per-tick inference failures
//! never surface here - the sampler logs and drops them.

use thiserror::Error;

/// Camera acquisition errors, surfaced to the user. Never retried
/// automatically; recovery is another Start press.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No video-input device present at enumeration time.
    #[error("no capture device available")]
    NoDevice,

    /// Enumeration or stream acquisition failed (permission denied,
    /// device busy, backend fault).
    #[error("failed to acquire capture stream: {0}")]
    Acquisition(#[source] anyhow::Error),
}

/// Model fetch/load failure. Fatal to the start attempt, not the session.
#[derive(Debug, Error)]
#[error("model load failed: {0}")]
pub struct ModelLoadError(#[from] anyhow::Error);

/// Errors a start attempt can surface to the caller.
///
/// Either way the controller is back in `Stopped` with no stream retained.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),
}

impl SessionError {
    /// True for errors the user should be alerted about directly
    /// (missing or unacquirable camera).
    pub fn is_user_alert(&self) -> bool {
        matches!(self, SessionError::Camera(_))
    }
}
