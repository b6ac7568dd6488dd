//! Voice: simulated speech-to-text and text-to-speech.

pub mod engine;
pub mod routes;

pub use engine::{Synthesis, Transcription, synthesize_speech, transcribe_audio};
