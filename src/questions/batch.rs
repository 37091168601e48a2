//! Question generation across all windows of a transcript.

use super::{GeneratedQuestion, SupervisorAgent, SupervisorOutcome};
use crate::windowing::TranscriptWindow;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{info, warn};

/// Runs the supervisor over windows in order.
pub struct BatchRunner {
    supervisor: SupervisorAgent,
    include_best_effort: bool,
    progress: Option<MultiProgress>,
}

impl BatchRunner {
    pub fn new(supervisor: SupervisorAgent, include_best_effort: bool) -> Self {
        Self {
            supervisor,
            include_best_effort,
            progress: None,
        }
    }

    /// Draw a per-window progress bar on `progress`.
    pub fn with_progress(mut self, progress: MultiProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        let Some(progress) = &self.progress else {
            return ProgressBar::hidden();
        };

        let pb = progress.add(ProgressBar::new(len));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} windows ({msg})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }

    /// Generate at most one question per window.
    ///
    /// Questions carry the 1-based ordinal of their window. Windows whose
    /// supervisor run is rejected are left out unless best-effort questions
    /// are enabled and one is available.
    pub async fn run(&self, windows: &[TranscriptWindow]) -> Vec<GeneratedQuestion> {
        let pb = self.progress_bar(windows.len() as u64);

        let mut questions = Vec::with_capacity(windows.len());

        for (index, window) in windows.iter().enumerate() {
            let ordinal = index + 1;
            pb.set_message(window.title.clone());

            match self.supervisor.run(&window.text).await {
                SupervisorOutcome::Accepted { question, .. } => {
                    questions.push(GeneratedQuestion::from_payload(question, ordinal));
                }
                SupervisorOutcome::Rejected {
                    failure,
                    best_effort,
                } => {
                    warn!(segment = ordinal, "{}", failure);
                    if let (true, Some(question)) = (self.include_best_effort, best_effort) {
                        questions.push(GeneratedQuestion::from_payload(question, ordinal));
                    }
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        info!(
            "Generated {} questions for {} windows",
            questions.len(),
            windows.len()
        );
        questions
    }
}
