//! Announcement gating.
//!
//! Converts detection results into at most one utterance per result,
//! deduplicated against the previously announced label. The gate holds the
//! only announcement state in the system: the last spoken class.

use std::sync::{Arc, Mutex};

use crate::detect::DetectionFrameResult;
use crate::speech::SpeechEngine;

/// Deduplicates and sequences spoken announcements.
///
/// The primary detection (first in the model-ordered sequence) is the sole
/// announcement candidate. An empty result never touches the memory: after
/// [cup] then [] then [cup], "cup" is spoken once.
pub struct AnnouncementGate {
    engine: Arc<dyn SpeechEngine>,
    memory: Mutex<Option<String>>,
    interrupt_on_clear: bool,
}

impl AnnouncementGate {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            memory: Mutex::new(None),
            interrupt_on_clear: false,
        }
    }

    /// When enabled, an empty result cancels in-flight speech (playback
    /// only - the dedup memory stays intact). Off by default.
    pub fn with_interrupt_on_clear(mut self, enabled: bool) -> Self {
        self.interrupt_on_clear = enabled;
        self
    }

    /// Feed one detection result through the gate.
    pub fn on_result(&self, result: &DetectionFrameResult) {
        let Some(primary) = result.primary() else {
            if self.interrupt_on_clear {
                self.engine.cancel_all();
            }
            return;
        };

        let mut memory = match self.memory.lock() {
            Ok(memory) => memory,
            Err(poisoned) => poisoned.into_inner(),
        };
        if memory.as_deref() == Some(primary.class.as_str()) {
            return;
        }

        log::debug!("announcing transition to \"{}\"", primary.class);
        self.engine.speak(&primary.class);
        *memory = Some(primary.class.clone());
    }

    /// Clear the memory and cancel any in-flight utterance. Called on
    /// session stop and on teardown.
    pub fn reset(&self) {
        match self.memory.lock() {
            Ok(mut memory) => *memory = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        self.engine.cancel_all();
    }

    /// The most recently announced class, if any.
    pub fn last_announced(&self) -> Option<String> {
        self.memory.lock().map(|memory| memory.clone()).unwrap_or(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, Detection};
    use crate::speech::StubSpeech;

    fn result(classes: &[&str]) -> DetectionFrameResult {
        DetectionFrameResult::from(
            classes
                .iter()
                .map(|class| Detection {
                    class: class.to_string(),
                    confidence: 0.9,
                    bbox: BoundingBox::default(),
                })
                .collect::<Vec<_>>(),
        )
    }

    fn gate() -> (Arc<StubSpeech>, AnnouncementGate) {
        let engine = Arc::new(StubSpeech::new());
        let gate = AnnouncementGate::new(engine.clone());
        (engine, gate)
    }

    #[test]
    fn identical_primaries_speak_once() {
        let (engine, gate) = gate();
        gate.on_result(&result(&["cup"]));
        gate.on_result(&result(&["cup"]));
        assert_eq!(engine.utterances(), vec!["cup"]);
    }

    #[test]
    fn each_transition_speaks() {
        let (engine, gate) = gate();
        for classes in [["cup"], ["bottle"], ["cup"]] {
            gate.on_result(&result(&classes));
        }
        assert_eq!(engine.utterances(), vec!["cup", "bottle", "cup"]);
    }

    #[test]
    fn empty_results_never_speak_and_keep_memory() {
        let (engine, gate) = gate();
        gate.on_result(&result(&[]));
        assert!(engine.utterances().is_empty());

        gate.on_result(&result(&["cup"]));
        gate.on_result(&result(&[]));
        gate.on_result(&result(&["cup"]));
        assert_eq!(engine.utterances(), vec!["cup"]);
        assert_eq!(gate.last_announced().as_deref(), Some("cup"));
    }

    #[test]
    fn only_primary_is_announced() {
        let (engine, gate) = gate();
        gate.on_result(&result(&["person", "dog"]));
        assert_eq!(engine.utterances(), vec!["person"]);
    }

    #[test]
    fn reset_clears_memory_and_cancels() {
        let (engine, gate) = gate();
        gate.on_result(&result(&["cup"]));
        gate.reset();

        assert_eq!(gate.last_announced(), None);
        assert_eq!(engine.cancellations(), 1);

        // The same class announces again after a reset.
        gate.on_result(&result(&["cup"]));
        assert_eq!(engine.utterances(), vec!["cup", "cup"]);
    }

    #[test]
    fn interrupt_on_clear_cancels_but_keeps_memory() {
        let engine = Arc::new(StubSpeech::new());
        let gate = AnnouncementGate::new(engine.clone()).with_interrupt_on_clear(true);

        gate.on_result(&result(&["cup"]));
        gate.on_result(&result(&[]));

        assert_eq!(engine.cancellations(), 1);
        assert_eq!(gate.last_announced().as_deref(), Some("cup"));

        gate.on_result(&result(&["cup"]));
        assert_eq!(engine.utterances(), vec!["cup"]);
    }
}
