//! Input level sampling
//!
//! The sequencer never reads a microphone directly. A [`LevelSource`]
//! produces normalized amplitude samples, and [`spawn_sampler`] runs one
//! on a tokio task as a bounded producer feeding the UI loop through an
//! mpsc channel. Cancellation is channel closure: drop the receiver and
//! the task exits on its next send.
//!
//! There is no real capture device in a practice mock; the scripted
//! source below plays a deterministic level envelope so speaking tasks
//! behave the same on every machine.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from the capture side
#[derive(Debug, Error)]
pub enum AudioError {
    /// The user has not granted microphone access
    #[error("microphone access is not allowed; enable it in the app config")]
    PermissionDenied,

    /// The capture source stopped producing samples
    #[error("audio input unavailable: {0}")]
    Unavailable(String),
}

/// One amplitude sample with its capture instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelFrame {
    pub at: Instant,
    /// Normalized input level in `0.0..=1.0`
    pub level: f32,
}

/// A source of normalized input levels
pub trait LevelSource: Send + 'static {
    /// The current input level
    fn level(&mut self) -> Result<f32, AudioError>;
}

/// Deterministic level envelope: a sequence of `(offset, level)` steps.
///
/// The level at elapsed time `t` is the level of the last step whose
/// offset is `<= t`; before the first step the source is silent.
#[derive(Debug, Clone)]
pub struct ScriptedMicrophone {
    started: Instant,
    steps: Vec<(Duration, f32)>,
}

impl ScriptedMicrophone {
    pub fn new(steps: Vec<(Duration, f32)>) -> Self {
        let mut steps = steps;
        steps.sort_by_key(|(offset, _)| *offset);
        Self { started: Instant::now(), steps }
    }

    /// Silent until `delay`, then speaking at a steady level
    pub fn voiced_after(delay: Duration) -> Self {
        Self::new(vec![(Duration::ZERO, 0.02), (delay, 0.75)])
    }

    /// Speaks from the start, pauses over `quiet`, then resumes
    pub fn with_pause(quiet: std::ops::Range<Duration>) -> Self {
        Self::new(vec![
            (Duration::ZERO, 0.7),
            (quiet.start, 0.03),
            (quiet.end, 0.7),
        ])
    }

    /// Never speaks
    pub fn silent() -> Self {
        Self::new(vec![(Duration::ZERO, 0.02)])
    }

    /// The scripted level at a given elapsed time
    pub fn level_at(&self, elapsed: Duration) -> f32 {
        self.steps
            .iter()
            .take_while(|(offset, _)| *offset <= elapsed)
            .last()
            .map(|(_, level)| *level)
            .unwrap_or(0.0)
    }
}

impl LevelSource for ScriptedMicrophone {
    fn level(&mut self) -> Result<f32, AudioError> {
        Ok(self.level_at(self.started.elapsed()))
    }
}

/// How often the sampler produces a frame
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(50);

/// Channel capacity; the producer blocks (backpressure) when the UI loop
/// falls behind rather than piling frames up
const CHANNEL_CAPACITY: usize = 32;

/// Run a level source on a background task, yielding frames until the
/// receiver is dropped or the source errors.
pub fn spawn_sampler(mut source: impl LevelSource) -> mpsc::Receiver<LevelFrame> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SAMPLE_PERIOD);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let level = match source.level() {
                Ok(level) => level.clamp(0.0, 1.0),
                Err(e) => {
                    tracing::warn!("level source stopped: {e}");
                    break;
                }
            };

            if tx.send(LevelFrame { at: Instant::now(), level }).await.is_err() {
                break; // consumer gone
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn scripted_levels_follow_the_envelope() {
        let mic = ScriptedMicrophone::voiced_after(ms(1200));
        assert!(mic.level_at(ms(0)) < 0.15);
        assert!(mic.level_at(ms(1199)) < 0.15);
        assert!(mic.level_at(ms(1200)) >= 0.15);
        assert!(mic.level_at(ms(5000)) >= 0.15);
    }

    #[test]
    fn pause_envelope_dips_and_recovers() {
        let mic = ScriptedMicrophone::with_pause(ms(1000)..ms(2000));
        assert!(mic.level_at(ms(500)) >= 0.15);
        assert!(mic.level_at(ms(1500)) < 0.15);
        assert!(mic.level_at(ms(2500)) >= 0.15);
    }

    #[test]
    fn steps_are_sorted_on_construction() {
        let mic = ScriptedMicrophone::new(vec![(ms(200), 0.9), (ms(0), 0.1)]);
        assert!(mic.level_at(ms(100)) < 0.15);
        assert!(mic.level_at(ms(300)) > 0.15);
    }

    #[tokio::test]
    async fn sampler_yields_frames_until_receiver_drops() {
        let mut rx = spawn_sampler(ScriptedMicrophone::silent());

        let first = rx.recv().await.expect("frame");
        assert!(first.level < 0.15);

        drop(rx);
        // Task exits on its next send; nothing to assert beyond not hanging.
    }
}
