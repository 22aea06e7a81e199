//! Timed recording sequencer
//!
//! Drives the linear state machine behind timed speaking tasks:
//! `idle -> preparing -> recording -> completed`, with terminal failure
//! branches for reflex tasks that never hear a voice and for sustained
//! mid-recording silence.
//!
//! The sequencer owns no timers. Callers feed it wall-clock instants (and
//! level samples, when available) through [`RecordingSequencer::tick`];
//! every duration is derived from instant deltas, so the machine stays
//! accurate however irregularly it is polled. Once a terminal phase is
//! reached, `tick` is a no-op and the polling loop should stop.

use std::time::{Duration, Instant};

use crate::bank::answer::SpokenOutcome;

/// Why a run ended without a usable recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// Reflex countdown elapsed without a voiced sample
    NoSpeech,
    /// Input stayed under the voice threshold for the whole silence window
    MidSilence,
}

/// Sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Preparing,
    Recording,
    Completed,
    Failed(FailReason),
}

impl Phase {
    /// Terminal phases are only left via an explicit reset
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Failed(_))
    }
}

/// Timing and threshold configuration for one run
#[derive(Debug, Clone, Copy)]
pub struct SequencerConfig {
    /// Preparation countdown before recording starts
    pub prepare: Duration,
    /// Maximum recording length
    pub record: Duration,
    /// Reflex task: start recording on the first voiced sample and fail
    /// if none arrives before the countdown ends
    pub reflex: bool,
    /// Normalized level at or above which a sample counts as voice
    pub voice_threshold: f32,
    /// Continuous sub-threshold time that fails a recording
    pub silence_window: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            prepare: Duration::from_secs(3),
            record: Duration::from_secs(30),
            reflex: false,
            voice_threshold: 0.15,
            silence_window: Duration::from_secs(3),
        }
    }
}

/// One captured level sample, relative to the start of recording
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSample {
    pub offset: Duration,
    pub level: f32,
}

/// The recording state machine
#[derive(Debug)]
pub struct RecordingSequencer {
    config: SequencerConfig,
    phase: Phase,
    phase_since: Option<Instant>,
    record_since: Option<Instant>,
    silence_since: Option<Instant>,
    reaction: Option<Duration>,
    recorded: Option<Duration>,
    clip: Vec<ClipSample>,
}

impl RecordingSequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            phase_since: None,
            record_since: None,
            silence_since: None,
            reaction: None,
            recorded: None,
            clip: Vec::new(),
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Reaction time of the early threshold crossing (reflex runs only)
    pub fn reaction(&self) -> Option<Duration> {
        self.reaction
    }

    /// Recorded length, once the run ended
    pub fn recorded(&self) -> Option<Duration> {
        self.recorded
    }

    /// Level trace captured while recording
    pub fn clip(&self) -> &[ClipSample] {
        &self.clip
    }

    /// Begin the preparation countdown. Only valid from idle.
    pub fn start(&mut self, now: Instant) {
        if self.phase == Phase::Idle {
            self.phase = Phase::Preparing;
            self.phase_since = Some(now);
        }
    }

    /// Manual stop: completes the run if currently recording
    pub fn stop(&mut self, now: Instant) {
        if self.phase == Phase::Recording {
            self.complete(now);
        }
    }

    /// Full reset back to idle, dropping timers and the captured clip
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Advance the machine. `level` is the latest normalized amplitude
    /// sample, if one arrived since the last tick. Returns the phase newly
    /// entered, if any.
    pub fn tick(&mut self, now: Instant, level: Option<f32>) -> Option<Phase> {
        match self.phase {
            Phase::Preparing => self.tick_preparing(now, level),
            Phase::Recording => self.tick_recording(now, level),
            Phase::Idle | Phase::Completed | Phase::Failed(_) => None,
        }
    }

    fn tick_preparing(&mut self, now: Instant, level: Option<f32>) -> Option<Phase> {
        let since = self.phase_since.unwrap_or(now);

        // Early start on voice, before the countdown check: a voiced
        // sample on the final tick still wins.
        if self.config.reflex {
            if let Some(level) = level {
                if level >= self.config.voice_threshold {
                    self.reaction = Some(now.duration_since(since));
                    return Some(self.enter_recording(now));
                }
            }
        }

        if now.duration_since(since) >= self.config.prepare {
            if self.config.reflex {
                self.phase = Phase::Failed(FailReason::NoSpeech);
                return Some(self.phase);
            }
            return Some(self.enter_recording(now));
        }

        None
    }

    fn tick_recording(&mut self, now: Instant, level: Option<f32>) -> Option<Phase> {
        let since = self.record_since.unwrap_or(now);

        if let Some(level) = level {
            self.clip.push(ClipSample { offset: now.duration_since(since), level });

            if level < self.config.voice_threshold {
                self.silence_since.get_or_insert(now);
            } else {
                self.silence_since = None;
            }
        }

        // Sustained silence fails the run regardless of remaining time.
        if let Some(silent) = self.silence_since {
            if now.duration_since(silent) >= self.config.silence_window {
                self.recorded = Some(now.duration_since(since));
                self.phase = Phase::Failed(FailReason::MidSilence);
                return Some(self.phase);
            }
        }

        if now.duration_since(since) >= self.config.record {
            self.complete(now);
            return Some(self.phase);
        }

        None
    }

    fn enter_recording(&mut self, now: Instant) -> Phase {
        self.phase = Phase::Recording;
        self.phase_since = Some(now);
        self.record_since = Some(now);
        self.silence_since = None;
        Phase::Recording
    }

    fn complete(&mut self, now: Instant) {
        let since = self.record_since.unwrap_or(now);
        self.recorded = Some(now.duration_since(since));
        self.phase = Phase::Completed;
    }

    /// Countdown remaining while preparing
    pub fn prepare_remaining(&self, now: Instant) -> Option<Duration> {
        match (self.phase, self.phase_since) {
            (Phase::Preparing, Some(since)) => {
                Some(self.config.prepare.saturating_sub(now.duration_since(since)))
            }
            _ => None,
        }
    }

    /// Recording time remaining
    pub fn record_remaining(&self, now: Instant) -> Option<Duration> {
        match (self.phase, self.record_since) {
            (Phase::Recording, Some(since)) => {
                Some(self.config.record.saturating_sub(now.duration_since(since)))
            }
            _ => None,
        }
    }

    /// Map a terminal phase to the attempt outcome
    pub fn outcome(&self) -> Option<SpokenOutcome> {
        match self.phase {
            Phase::Completed => Some(SpokenOutcome::Completed {
                duration_ms: self.recorded.unwrap_or_default().as_millis() as u64,
                reaction_ms: self.reaction.map(|d| d.as_millis() as u64),
            }),
            Phase::Failed(FailReason::NoSpeech) => Some(SpokenOutcome::NoSpeech),
            Phase::Failed(FailReason::MidSilence) => Some(SpokenOutcome::Silence),
            Phase::Idle | Phase::Preparing | Phase::Recording => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reflex_config() -> SequencerConfig {
        SequencerConfig {
            prepare: Duration::from_secs(3),
            record: Duration::from_secs(10),
            reflex: true,
            voice_threshold: 0.15,
            silence_window: Duration::from_secs(3),
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn voice_crossing_starts_recording_with_reaction_time() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);

        assert_eq!(seq.tick(t0 + ms(500), Some(0.02)), None);
        assert_eq!(seq.phase(), Phase::Preparing);

        let entered = seq.tick(t0 + ms(1200), Some(0.8));
        assert_eq!(entered, Some(Phase::Recording));
        assert_eq!(seq.reaction(), Some(ms(1200)));
    }

    #[test]
    fn reflex_countdown_without_voice_fails() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);

        seq.tick(t0 + ms(1000), Some(0.05));
        seq.tick(t0 + ms(2000), Some(0.01));
        let entered = seq.tick(t0 + ms(3000), Some(0.05));
        assert_eq!(entered, Some(Phase::Failed(FailReason::NoSpeech)));
        assert!(seq.phase().is_terminal());
    }

    #[test]
    fn non_reflex_countdown_rolls_into_recording() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(SequencerConfig {
            reflex: false,
            ..reflex_config()
        });
        seq.start(t0);

        assert_eq!(seq.tick(t0 + ms(2999), None), None);
        assert_eq!(seq.tick(t0 + ms(3000), None), Some(Phase::Recording));
        assert_eq!(seq.reaction(), None);
    }

    #[test]
    fn sustained_silence_fails_mid_recording() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);
        seq.tick(t0 + ms(500), Some(0.9)); // recording from 0.5s

        // Speaks briefly, then goes quiet at 1.5s.
        seq.tick(t0 + ms(1000), Some(0.7));
        seq.tick(t0 + ms(1500), Some(0.05));
        assert_eq!(seq.tick(t0 + ms(3000), Some(0.04)), None);

        // 3.0s of continuous silence, well before the 10s recording ends.
        let entered = seq.tick(t0 + ms(4500), Some(0.03));
        assert_eq!(entered, Some(Phase::Failed(FailReason::MidSilence)));
    }

    #[test]
    fn voice_resets_the_silence_window() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);
        seq.tick(t0 + ms(500), Some(0.9));

        seq.tick(t0 + ms(1000), Some(0.05));
        seq.tick(t0 + ms(3500), Some(0.8)); // speaks again just in time
        assert_eq!(seq.tick(t0 + ms(6000), Some(0.05)), None);
        assert_eq!(seq.phase(), Phase::Recording);
    }

    #[test]
    fn recording_completes_when_time_elapses() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);
        seq.tick(t0 + ms(1000), Some(0.9));

        let entered = seq.tick(t0 + ms(11_000), Some(0.9));
        assert_eq!(entered, Some(Phase::Completed));
        assert_eq!(seq.recorded(), Some(ms(10_000)));
        assert_eq!(
            seq.outcome(),
            Some(SpokenOutcome::Completed { duration_ms: 10_000, reaction_ms: Some(1000) })
        );
    }

    #[test]
    fn manual_stop_completes_early() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);
        seq.tick(t0 + ms(1000), Some(0.9));

        seq.stop(t0 + ms(5000));
        assert_eq!(seq.phase(), Phase::Completed);
        assert_eq!(seq.recorded(), Some(ms(4000)));
    }

    #[test]
    fn terminal_phases_ignore_ticks_until_reset() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);
        seq.tick(t0 + ms(3000), None); // NoSpeech

        assert!(seq.phase().is_terminal());
        assert_eq!(seq.tick(t0 + ms(9000), Some(0.9)), None);
        assert!(seq.phase().is_terminal());

        seq.reset();
        assert_eq!(seq.phase(), Phase::Idle);
        assert!(seq.clip().is_empty());
        assert_eq!(seq.reaction(), None);
    }

    #[test]
    fn clip_captures_levels_only_while_recording() {
        let t0 = Instant::now();
        let mut seq = RecordingSequencer::new(reflex_config());
        seq.start(t0);

        seq.tick(t0 + ms(200), Some(0.01)); // preparing, not captured
        seq.tick(t0 + ms(1000), Some(0.9)); // enters recording
        seq.tick(t0 + ms(1500), Some(0.6));
        seq.tick(t0 + ms(2000), Some(0.4));

        assert_eq!(seq.clip().len(), 2);
        assert_eq!(seq.clip()[0].offset, ms(500));
    }
}
