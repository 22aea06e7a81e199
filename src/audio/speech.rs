//! Speech playback
//!
//! Listening tasks play their prompts through a [`SpeechEngine`]. The
//! engine is a process-wide single channel: starting a new utterance
//! always cancels the one in flight, so at most one utterance is ever
//! audible. The simulated engine derives playback time from word count
//! and rate; the UI only needs to know whether speech is still playing.

use std::time::{Duration, Instant};

/// One piece of text to speak
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    /// Speaking rate multiplier; 1.0 is normal speed
    pub rate: f32,
    /// Preferred voice name, if the engine offers a choice
    pub voice: Option<String>,
}

impl Utterance {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), rate: 1.0, voice: None }
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }
}

/// Baseline speaking speed in words per minute at rate 1.0
const BASE_WPM: f32 = 150.0;

/// Estimated playback time for an utterance
pub fn utterance_duration(utterance: &Utterance) -> Duration {
    let words = crate::scoring::text::word_count(&utterance.text) as f32;
    let rate = utterance.rate.max(0.1);
    let minutes = words / (BASE_WPM * rate);
    Duration::from_secs_f32(minutes * 60.0)
}

/// A single-channel speech output
pub trait SpeechEngine {
    /// Speak an utterance, cancelling any in-flight speech first
    fn speak(&mut self, utterance: Utterance);

    /// Stop whatever is playing
    fn cancel(&mut self);

    /// Whether an utterance is still playing
    fn is_speaking(&self) -> bool;
}

/// Simulated engine: tracks a deadline instead of producing sound
#[derive(Debug, Default)]
pub struct SimulatedSpeech {
    playing_until: Option<Instant>,
    current_text: Option<String>,
}

impl SimulatedSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the in-flight utterance, for display
    pub fn current_text(&self) -> Option<&str> {
        if self.is_speaking() { self.current_text.as_deref() } else { None }
    }

    /// Playback time remaining
    pub fn remaining(&self) -> Duration {
        self.playing_until
            .map(|until| until.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }
}

impl SpeechEngine for SimulatedSpeech {
    fn speak(&mut self, utterance: Utterance) {
        // Implicit cancel: replacing the deadline silences the previous
        // utterance.
        self.playing_until = Some(Instant::now() + utterance_duration(&utterance));
        self.current_text = Some(utterance.text);
    }

    fn cancel(&mut self) {
        self.playing_until = None;
        self.current_text = None;
    }

    fn is_speaking(&self) -> bool {
        self.playing_until.is_some_and(|until| Instant::now() < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_scales_with_rate() {
        let slow = Utterance::new("one two three four five six").with_rate(0.5);
        let fast = Utterance::new("one two three four five six").with_rate(2.0);
        assert!(utterance_duration(&slow) > utterance_duration(&fast));
    }

    #[test]
    fn empty_text_has_zero_duration() {
        assert_eq!(utterance_duration(&Utterance::new("")), Duration::ZERO);
    }

    #[test]
    fn speak_replaces_the_in_flight_utterance() {
        let mut engine = SimulatedSpeech::new();
        engine.speak(Utterance::new(
            "a long sentence with plenty of words to keep the channel busy for a while",
        ));
        assert!(engine.is_speaking());

        engine.speak(Utterance::new("short replacement"));
        assert_eq!(engine.current_text(), Some("short replacement"));
    }

    #[test]
    fn cancel_silences_playback() {
        let mut engine = SimulatedSpeech::new();
        engine.speak(Utterance::new("some words to say out loud"));
        engine.cancel();
        assert!(!engine.is_speaking());
        assert_eq!(engine.current_text(), None);
    }
}
