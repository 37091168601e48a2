//! Configuration module for Clipquiz.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QuestionPrompts};
pub use settings::{
    CaptionSettings, CompletionSettings, GeneralSettings, GenerationSettings, PromptSettings,
    RouterKind, SamplingSettings, SegmentationSettings, ServerSettings, Settings,
    TimeoutSettings, TranscriptionSettings,
};
