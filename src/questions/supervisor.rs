//! Bounded generate → validate → review loop for a single window.

use super::{validate, ArchetypeRouter, Generator, QuestionPayload, Reviewer, ReviewVerdict};
use crate::error::GenerationFailure;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of supervising one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorOutcome {
    Accepted {
        question: QuestionPayload,
        attempts: u32,
    },
    /// Every attempt failed. `best_effort` holds the final attempt's question
    /// if it was at least syntactically valid.
    Rejected {
        failure: GenerationFailure,
        best_effort: Option<QuestionPayload>,
    },
}

/// State of a single attempt.
enum Attempt {
    Draft(String),
    Validated(QuestionPayload),
    Reviewed(QuestionPayload, ReviewVerdict),
    Accepted(QuestionPayload),
    Failed(GenerationFailure),
}

/// Corrective notes carried from failed attempts into later prompts.
#[derive(Debug, Default)]
struct Feedback {
    notes: Vec<String>,
}

impl Feedback {
    fn record(&mut self, failure: &GenerationFailure) {
        let note = match failure {
            GenerationFailure::MalformedOutput(detail) => format!(
                "The previous attempt produced malformed output ({detail}). \
                 Return only valid JSON in the required format."
            ),
            GenerationFailure::ReviewRejected(feedback) => format!(
                "The previous question was invalid. Feedback: {feedback}. \
                 Please generate a new question addressing this feedback."
            ),
            GenerationFailure::RetriesExhausted { .. } => return,
        };
        self.notes.push(note);
    }

    fn render(&self) -> String {
        self.notes.join("\n")
    }
}

/// Drives one window through at most `max_attempts` generation cycles.
pub struct SupervisorAgent {
    router: Arc<dyn ArchetypeRouter>,
    generator: Generator,
    reviewer: Reviewer,
    max_attempts: u32,
}

impl SupervisorAgent {
    pub fn new(
        router: Arc<dyn ArchetypeRouter>,
        generator: Generator,
        reviewer: Reviewer,
        max_attempts: u32,
    ) -> Self {
        Self {
            router,
            generator,
            reviewer,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Produce a question for `text`.
    ///
    /// Each attempt routes the text, makes one generator call and, if the draft
    /// validates, one reviewer call. Failures of either kind are turned into
    /// feedback for the next attempt.
    #[instrument(skip(self, text), fields(max_attempts = self.max_attempts))]
    pub async fn run(&self, text: &str) -> SupervisorOutcome {
        let mut feedback = Feedback::default();
        let mut best_effort = None;

        for attempt in 1..=self.max_attempts {
            best_effort = None;
            let schema = self.router.route(text).await;

            let mut state = match self.generator.generate(text, &schema, &feedback.render()).await {
                Ok(raw) => Attempt::Draft(raw),
                Err(e) => Attempt::Failed(GenerationFailure::MalformedOutput(format!(
                    "completion failed: {e}"
                ))),
            };

            loop {
                state = match state {
                    Attempt::Draft(raw) => match validate(&raw, &schema) {
                        Ok(payload) => Attempt::Validated(payload),
                        Err(failure) => Attempt::Failed(failure),
                    },
                    Attempt::Validated(payload) => {
                        best_effort = Some(payload.clone());
                        let verdict = self.reviewer.review(text, &payload).await;
                        Attempt::Reviewed(payload, verdict)
                    }
                    Attempt::Reviewed(payload, verdict) if verdict.is_valid => {
                        Attempt::Accepted(payload)
                    }
                    Attempt::Reviewed(_, verdict) => {
                        Attempt::Failed(GenerationFailure::ReviewRejected(verdict.feedback))
                    }
                    Attempt::Accepted(question) => {
                        info!(attempt, "Question accepted");
                        return SupervisorOutcome::Accepted {
                            question,
                            attempts: attempt,
                        };
                    }
                    Attempt::Failed(failure) => {
                        debug!(attempt, "Attempt failed: {}", failure);
                        feedback.record(&failure);
                        break;
                    }
                };
            }
        }

        warn!("No acceptable question after {} attempts", self.max_attempts);
        SupervisorOutcome::Rejected {
            failure: GenerationFailure::RetriesExhausted {
                attempts: self.max_attempts,
            },
            best_effort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::testing::ScriptedCompletion;
    use crate::config::{QuestionPrompts, SamplingSettings};
    use crate::questions::{AnswerKey, FixedRouter};

    const VALID: &str =
        r#"{"question": "How many edges does C4 have?", "options": ["3", "4", "5", "6"], "correct_answer": 1}"#;
    const ACCEPT: &str = r#"{"is_valid": true, "feedback": ""}"#;
    const REJECT: &str = r#"{"is_valid": false, "feedback": "Answer is not in the transcript"}"#;

    fn sampling() -> SamplingSettings {
        SamplingSettings {
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    fn supervisor(
        generator: Arc<ScriptedCompletion>,
        reviewer: Arc<ScriptedCompletion>,
    ) -> SupervisorAgent {
        let prompts = QuestionPrompts::default();
        SupervisorAgent::new(
            Arc::new(FixedRouter::default()),
            Generator::new(generator, prompts.clone(), sampling()),
            Reviewer::new(reviewer, &prompts.review, sampling()),
            3,
        )
    }

    #[tokio::test]
    async fn test_accepts_on_first_attempt() {
        let generator = Arc::new(ScriptedCompletion::new([VALID]));
        let reviewer = Arc::new(ScriptedCompletion::new([ACCEPT]));

        let outcome = supervisor(generator.clone(), reviewer.clone())
            .run("cycle graph C4 has four edges")
            .await;

        match outcome {
            SupervisorOutcome::Accepted { question, attempts } => {
                assert_eq!(attempts, 1);
                assert_eq!(question.correct_answer, AnswerKey::Single(1));
            }
            other => panic!("expected acceptance, got {other:?}"),
        }
        assert_eq!(generator.calls(), 1);
        assert_eq!(reviewer.calls(), 1);
    }

    #[tokio::test]
    async fn test_retries_after_malformed_output() {
        let generator = Arc::new(ScriptedCompletion::new([
            "not json at all",
            r#"{"question": "Q?", "options": ["a"], "correct_answer": 0}"#,
            VALID,
        ]));
        let reviewer = Arc::new(ScriptedCompletion::new([ACCEPT]));

        let outcome = supervisor(generator.clone(), reviewer.clone())
            .run("text")
            .await;

        assert!(matches!(outcome, SupervisorOutcome::Accepted { attempts: 3, .. }));
        assert_eq!(generator.calls(), 3);
        // Malformed drafts never reach the reviewer
        assert_eq!(reviewer.calls(), 1);

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[1].contains("malformed output"));
        assert!(prompts[2].contains("expected 4 options"));
    }

    #[tokio::test]
    async fn test_rejection_after_exhausting_attempts() {
        let generator = Arc::new(ScriptedCompletion::new([VALID]));
        let reviewer = Arc::new(ScriptedCompletion::new([REJECT]));

        let outcome = supervisor(generator.clone(), reviewer.clone())
            .run("text")
            .await;

        match outcome {
            SupervisorOutcome::Rejected {
                failure,
                best_effort,
            } => {
                assert_eq!(failure, GenerationFailure::RetriesExhausted { attempts: 3 });
                assert_eq!(best_effort.unwrap().question, "How many edges does C4 have?");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(generator.calls(), 3);
        assert_eq!(reviewer.calls(), 3);

        // Reviewer feedback accumulates into later prompts
        let prompts = generator.prompts.lock().unwrap();
        assert!(!prompts[0].contains("Feedback:"));
        assert!(prompts[1].contains("Answer is not in the transcript"));
        assert_eq!(prompts[2].matches("Answer is not in the transcript").count(), 2);
    }

    #[tokio::test]
    async fn test_no_best_effort_when_last_attempt_malformed() {
        let generator = Arc::new(ScriptedCompletion::new([VALID, VALID, "garbage"]));
        let reviewer = Arc::new(ScriptedCompletion::new([REJECT]));

        let outcome = supervisor(generator, reviewer).run("text").await;

        assert!(matches!(
            outcome,
            SupervisorOutcome::Rejected {
                best_effort: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_completion_errors_consume_attempts() {
        let generator = Arc::new(ScriptedCompletion::failing());
        let reviewer = Arc::new(ScriptedCompletion::new([ACCEPT]));

        let outcome = supervisor(generator.clone(), reviewer.clone())
            .run("text")
            .await;

        assert!(matches!(outcome, SupervisorOutcome::Rejected { .. }));
        assert_eq!(generator.calls(), 3);
        assert_eq!(reviewer.calls(), 0);
    }
}
