use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::speech::SpeechEngine;

/// Engine that announces through the log. Stands in for a real
/// synthesizer in headless deployments.
#[derive(Default)]
pub struct LogSpeech;

impl SpeechEngine for LogSpeech {
    fn speak(&self, text: &str) {
        log::info!("announcing \"{}\"", text);
    }

    fn cancel_all(&self) {
        log::debug!("speech cancelled");
    }
}

/// Engine that records utterances and cancellations for assertions.
#[derive(Default)]
pub struct StubSpeech {
    utterances: Mutex<Vec<String>>,
    cancellations: AtomicUsize,
}

impl StubSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every utterance spoken so far, in order.
    pub fn utterances(&self) -> Vec<String> {
        self.utterances
            .lock()
            .map(|utterances| utterances.clone())
            .unwrap_or_default()
    }

    pub fn cancellations(&self) -> usize {
        self.cancellations.load(Ordering::SeqCst)
    }
}

impl SpeechEngine for StubSpeech {
    fn speak(&self, text: &str) {
        if let Ok(mut utterances) = self.utterances.lock() {
            utterances.push(text.to_string());
        }
    }

    fn cancel_all(&self) {
        self.cancellations.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_records_in_order() {
        let engine = StubSpeech::new();
        engine.speak("person");
        engine.speak("dog");
        engine.cancel_all();

        assert_eq!(engine.utterances(), vec!["person", "dog"]);
        assert_eq!(engine.cancellations(), 1);
    }
}
