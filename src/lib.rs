//! Clipquiz - quiz questions from video transcripts
//!
//! Turns a YouTube video into timed, labeled transcript windows with one
//! reviewed quiz question per window.
//!
//! # Overview
//!
//! For each video Clipquiz:
//! - Fetches captions, or transcribes the audio track when there are none
//! - Splits the transcript into fixed-duration windows with heuristic titles
//! - Generates a question per window, checking it for well-formedness and
//!   asking a reviewer whether it is faithful to the window text
//!
//! # Architecture
//!
//! - `config` - Configuration management and prompt templates
//! - `video_source` - URL parsing and caption fetching
//! - `audio` - Audio download and waveform conversion
//! - `transcription` - Chunked speech recognition
//! - `acquisition` - Captions-first transcript acquisition with audio fallback
//! - `windowing` - Segmentation and labeling
//! - `completion` - Text-completion service abstraction
//! - `questions` - Generation, validation, review and supervision
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use clipquiz::config::Settings;
//! use clipquiz::orchestrator::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(&settings)?;
//!
//!     let result = pipeline.process("https://youtu.be/dQw4w9WgXcQ").await?;
//!     println!("{} windows, {} questions", result.segments.len(), result.questions.len());
//!
//!     Ok(())
//! }
//! ```

pub mod acquisition;
pub mod audio;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod openai;
pub mod orchestrator;
pub mod questions;
pub mod transcription;
pub mod video_source;
pub mod windowing;

pub use error::{ClipquizError, Result};
