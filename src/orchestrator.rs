//! Pipeline orchestrator for Clipquiz.
//!
//! Coordinates the whole process from a video URL to windows and questions.

use crate::acquisition::TranscriptAcquirer;
use crate::audio::{FfmpegConverter, FormatConverter, YtDlpDownloader};
use crate::completion::{ChatCompletion, CompletionService};
use crate::config::{Prompts, RouterKind, Settings};
use crate::error::Result;
use crate::openai::create_client;
use crate::questions::{
    ArchetypeRouter, BatchRunner, ClassifierRouter, FixedRouter, GeneratedQuestion, Generator,
    Reviewer, SupervisorAgent,
};
use crate::transcription::{ChunkedSpeechRecognizer, TranscriptSource, WhisperRecognizer};
use crate::video_source::{VideoIdentifier, YtDlpCaptionFetcher};
use crate::windowing::{Segmenter, TranscriptWindow};
use indicatif::MultiProgress;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of processing one video.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub video_id: String,
    pub source: TranscriptSource,
    pub segments: Vec<TranscriptWindow>,
    pub questions: Vec<GeneratedQuestion>,
    /// The URL exactly as submitted.
    pub video_url: String,
}

impl PipelineResult {
    /// The response body served to clients: `{"0": {segments, questions, video_url}}`.
    pub fn response_body(&self) -> serde_json::Value {
        serde_json::json!({
            "0": {
                "segments": self.segments,
                "questions": self.questions,
                "video_url": self.video_url,
            }
        })
    }
}

/// The main pipeline: identify → acquire → segment → generate.
pub struct Pipeline {
    identifier: VideoIdentifier,
    acquirer: TranscriptAcquirer,
    segmenter: Segmenter,
    batch: BatchRunner,
}

impl Pipeline {
    /// Build the production pipeline from settings, without progress output.
    ///
    /// The API client is created once here and shared by every component.
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::build(settings, None)
    }

    /// Build the production pipeline, drawing chunk and window progress on `progress`.
    pub fn with_progress(settings: &Settings, progress: MultiProgress) -> Result<Self> {
        Self::build(settings, Some(progress))
    }

    fn build(settings: &Settings, progress: Option<MultiProgress>) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        let client = create_client(&settings.completion)?;
        let timeout = settings.external_timeout();

        let cookies_file = settings
            .captions
            .cookies_file
            .as_deref()
            .map(Settings::expand_path);

        let converter: Arc<dyn FormatConverter> = Arc::new(FfmpegConverter::new(
            settings.transcription.sample_rate,
            timeout,
        ));
        let mut speech = ChunkedSpeechRecognizer::new(
            converter.clone(),
            Arc::new(WhisperRecognizer::new(
                client.clone(),
                &settings.transcription.model,
                &settings.captions.language,
                timeout,
            )),
            f64::from(settings.transcription.chunk_seconds),
        );
        if let Some(progress) = &progress {
            speech = speech.with_progress(progress.clone());
        }
        let acquirer = TranscriptAcquirer::new(
            Arc::new(YtDlpCaptionFetcher::new(
                &settings.captions.language,
                cookies_file.clone(),
                timeout,
            )),
            Arc::new(YtDlpDownloader::new(cookies_file, timeout)),
            converter,
            speech,
            settings.temp_dir(),
            timeout,
        );

        let completion: Arc<dyn CompletionService> =
            Arc::new(ChatCompletion::new(client, &settings.completion.model));
        let generation = &settings.generation;

        let router: Arc<dyn ArchetypeRouter> = match generation.router {
            RouterKind::Fixed => Arc::new(FixedRouter::default()),
            RouterKind::Classifier => Arc::new(ClassifierRouter::new(
                completion.clone(),
                &prompts.questions.classify,
                generation.classifier,
            )),
        };
        let supervisor = SupervisorAgent::new(
            router,
            Generator::new(
                completion.clone(),
                prompts.questions.clone(),
                generation.generator,
            ),
            Reviewer::new(completion, &prompts.questions.review, generation.reviewer),
            generation.max_attempts,
        );

        info!(
            "Pipeline ready (model {}, router {}, {} attempts per window)",
            settings.completion.model, generation.router, generation.max_attempts
        );

        let mut batch = BatchRunner::new(supervisor, generation.include_best_effort);
        if let Some(progress) = progress {
            batch = batch.with_progress(progress);
        }

        Ok(Self::with_components(
            acquirer,
            Segmenter::new(settings.segmentation.window_seconds),
            batch,
        ))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        acquirer: TranscriptAcquirer,
        segmenter: Segmenter,
        batch: BatchRunner,
    ) -> Self {
        Self {
            identifier: VideoIdentifier::new(),
            acquirer,
            segmenter,
            batch,
        }
    }

    /// Process a video URL into labeled windows and accepted questions.
    #[instrument(skip(self))]
    pub async fn process(&self, video_url: &str) -> Result<PipelineResult> {
        let video = self.identifier.identify(video_url)?;
        info!(video_id = %video.video_id, "Processing video");

        let transcript = self.acquirer.acquire(&video).await?;
        info!(
            "Transcript from {} with {} segments ({:.1}s)",
            transcript.source,
            transcript.segments.len(),
            transcript.duration_seconds()
        );

        let segments = self
            .segmenter
            .segment(&transcript.segments, &video.share_url());
        info!("Split transcript into {} windows", segments.len());

        let questions = self.batch.run(&segments).await;

        Ok(PipelineResult {
            video_id: video.video_id,
            source: transcript.source,
            segments,
            questions,
            video_url: video_url.to_string(),
        })
    }
}
