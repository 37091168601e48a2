//! Transcript windowing.
//!
//! Raw caption or speech segments are merged into fixed-duration windows, each
//! labeled with a heuristic title and description.

mod labeler;
mod segmenter;

pub use labeler::{HeuristicLabeler, Label};
pub use segmenter::Segmenter;

use serde::{Deserialize, Serialize};

/// A labeled slice of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWindow {
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    pub text: String,
    pub title: String,
    pub video_url: String,
    pub description: String,
}
