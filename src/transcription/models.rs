//! Data models for transcripts prior to windowing.

use serde::{Deserialize, Serialize};

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    /// Published or auto-generated captions.
    Captions,
    /// Speech recognition over the downloaded audio.
    SpeechRecognition,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Captions => write!(f, "captions"),
            TranscriptSource::SpeechRecognition => write!(f, "speech recognition"),
        }
    }
}

/// A timestamped piece of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    pub text: String,
}

impl RawSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Build a segment from a caption's start and duration.
    pub fn from_caption(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self::new(start, start + duration, text)
    }
}

/// The raw transcript of one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub source: TranscriptSource,
    pub segments: Vec<RawSegment>,
}

impl Transcript {
    pub fn new(video_id: String, source: TranscriptSource, segments: Vec<RawSegment>) -> Self {
        Self {
            video_id,
            source,
            segments,
        }
    }

    /// End of the last segment.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }
}
