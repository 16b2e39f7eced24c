//! Speech-synthesis capability.
//!
//! The engine is an external collaborator: `speak` is fire-and-forget and
//! the engine owns whatever utterance queue it keeps; `cancel_all` drops
//! in-flight and queued utterances. This crate never buffers utterances
//! itself.
//!
//! Engines:
//! - Log (`log://`, daemon default): announces through the log
//! - Stub (`stub://`, tests and demos): records utterances for assertions

mod backends;

use std::sync::Arc;

use anyhow::Result;

pub use backends::{LogSpeech, StubSpeech};

/// Speech-synthesis engine capability.
pub trait SpeechEngine: Send + Sync {
    /// Queue an utterance. Fire-and-forget; completion is never observed.
    fn speak(&self, text: &str);

    /// Cancel any in-flight or queued utterances.
    fn cancel_all(&self);
}

/// Open a speech engine from a URL, dispatching on scheme.
pub fn open_engine(url: &str) -> Result<Arc<dyn SpeechEngine>> {
    if url.starts_with("log://") {
        return Ok(Arc::new(LogSpeech::default()));
    }
    if url.starts_with("stub://") {
        return Ok(Arc::new(StubSpeech::new()));
    }
    anyhow::bail!("unsupported speech URL '{}'", url)
}
