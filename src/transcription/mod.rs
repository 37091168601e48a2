//! Transcription module for Clipquiz.
//!
//! Raw transcript models and the speech recognition side of the audio fallback.

mod chunked;
mod models;
mod recognizer;

pub use chunked::{chunk_bounds, ChunkedSpeechRecognizer, UNINTELLIGIBLE};
pub use models::{RawSegment, Transcript, TranscriptSource};
pub use recognizer::{Recognition, SpeechRecognizer, WhisperRecognizer};
