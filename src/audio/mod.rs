//! Audio adapters and the recording state machine
//!
//! Speaking and listening tasks are the only parts of the app that touch
//! anything resembling a device. The seams are traits: a level source
//! standing in for the microphone, and a speech engine standing in for
//! text-to-speech output. The sequencer in between is pure state driven
//! by wall-clock ticks.

pub mod sampler;
pub mod sequencer;
pub mod speech;

pub use sampler::{AudioError, LevelFrame, LevelSource, ScriptedMicrophone, spawn_sampler};
pub use sequencer::{FailReason, Phase, RecordingSequencer, SequencerConfig};
pub use speech::{SimulatedSpeech, SpeechEngine, Utterance};
