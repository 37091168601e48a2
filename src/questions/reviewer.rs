//! Second-pass review of validated questions.

use super::{extract_json_object, QuestionPayload, ReviewVerdict};
use crate::completion::CompletionService;
use crate::config::{Prompts, SamplingSettings};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Judges whether a question is faithful to its window text.
pub struct Reviewer {
    completion: Arc<dyn CompletionService>,
    template: String,
    sampling: SamplingSettings,
}

impl Reviewer {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        template: &str,
        sampling: SamplingSettings,
    ) -> Self {
        Self {
            completion,
            template: template.to_string(),
            sampling,
        }
    }

    /// Review `question` against `text`. Never fails: an unreachable service or
    /// an unreadable answer yields an invalid verdict.
    pub async fn review(&self, text: &str, question: &QuestionPayload) -> ReviewVerdict {
        let question_json = match serde_json::to_string(question) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize question for review: {}", e);
                return ReviewVerdict::unreadable();
            }
        };

        let vars = HashMap::from([("transcript", text), ("question", question_json.as_str())]);
        let prompt = Prompts::render(&self.template, &vars);

        let response = match self.completion.complete(&prompt, self.sampling).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Review request failed: {}", e);
                return ReviewVerdict::unreadable();
            }
        };

        let verdict: ReviewVerdict = serde_json::from_str(extract_json_object(&response))
            .unwrap_or_else(|_| ReviewVerdict::unreadable());
        debug!(is_valid = verdict.is_valid, "Review verdict");
        verdict
    }
}
