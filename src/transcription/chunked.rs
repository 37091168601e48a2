//! Fixed-length chunked recognition of a converted waveform.

use super::{Recognition, RawSegment, SpeechRecognizer};
use crate::audio::FormatConverter;
use crate::error::{AcquisitionFailure, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Text recorded for a chunk without recognizable speech.
pub const UNINTELLIGIBLE: &str = "[Unintelligible]";

/// Trailing audio shorter than this is merged into the previous chunk.
pub const MIN_CHUNK_SECONDS: f64 = 0.5;

/// Splits a waveform into fixed chunks and recognizes them in order.
pub struct ChunkedSpeechRecognizer {
    converter: Arc<dyn FormatConverter>,
    recognizer: Arc<dyn SpeechRecognizer>,
    chunk_seconds: f64,
    progress: Option<MultiProgress>,
}

impl ChunkedSpeechRecognizer {
    pub fn new(
        converter: Arc<dyn FormatConverter>,
        recognizer: Arc<dyn SpeechRecognizer>,
        chunk_seconds: f64,
    ) -> Self {
        Self {
            converter,
            recognizer,
            chunk_seconds,
            progress: None,
        }
    }

    /// Draw a per-chunk progress bar on `progress`.
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
                .template("  {spinner:.green} Speech    [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Recognize `waveform`, writing chunk files into `scratch`.
    ///
    /// Each chunk file is removed as soon as it has been recognized.
    #[instrument(skip(self, scratch), fields(waveform = %waveform.display()))]
    pub async fn transcribe(&self, waveform: &Path, scratch: &Path) -> Result<Vec<RawSegment>> {
        let total = self
            .converter
            .duration(waveform)
            .await
            .map_err(|e| AcquisitionFailure::Conversion(e.to_string()))?;

        let bounds = chunk_bounds(total, self.chunk_seconds);
        if bounds.is_empty() {
            return Err(AcquisitionFailure::Conversion("converted audio is empty".to_string()).into());
        }

        info!("Recognizing {} chunks ({:.1}s of audio)", bounds.len(), total);

        let pb = self.progress_bar(bounds.len() as u64);

        let mut segments = Vec::with_capacity(bounds.len());
        for (idx, (start, end)) in bounds.into_iter().enumerate() {
            let chunk_path = scratch.join(format!("chunk_{:04}.wav", idx));

            let outcome = self.recognize_chunk(waveform, &chunk_path, start, end).await;
            let _ = tokio::fs::remove_file(&chunk_path).await;

            let text = match outcome {
                Ok(Recognition::Text(text)) => text,
                Ok(Recognition::Unrecognized) => {
                    warn!("Chunk {} at {:.0}s was unintelligible", idx, start);
                    UNINTELLIGIBLE.to_string()
                }
                Err(e) => {
                    pb.finish_and_clear();
                    return Err(e);
                }
            };

            segments.push(RawSegment::new(start, end, text));
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(segments)
    }

    async fn recognize_chunk(
        &self,
        waveform: &Path,
        chunk_path: &Path,
        start: f64,
        end: f64,
    ) -> Result<Recognition> {
        self.converter
            .slice(waveform, chunk_path, start, end - start)
            .await
            .map_err(|e| AcquisitionFailure::Conversion(e.to_string()))?;

        let recognition = self
            .recognizer
            .recognize(chunk_path)
            .await
            .map_err(|e| AcquisitionFailure::RecognitionService(e.to_string()))?;

        Ok(recognition)
    }
}

/// `(start, end)` pairs covering `[0, total)` in steps of `chunk`, the last one shorter.
///
/// A remainder under [`MIN_CHUNK_SECONDS`] extends the previous chunk instead of
/// becoming its own, and audio shorter than that yields no chunks at all.
pub fn chunk_bounds(total: f64, chunk: f64) -> Vec<(f64, f64)> {
    let mut bounds: Vec<(f64, f64)> = Vec::new();
    if !(total > 0.0) || !(chunk > 0.0) {
        return bounds;
    }

    let mut start = 0.0;
    while start < total {
        let end = (start + chunk).min(total);
        match bounds.last_mut() {
            Some(last) if end - start < MIN_CHUNK_SECONDS => last.1 = end,
            _ if end - start < MIN_CHUNK_SECONDS => {}
            _ => bounds.push((start, end)),
        }
        start += chunk;
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClipquizError;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Converter that writes empty chunk files and reports a fixed duration.
    struct FixedDuration(f64);

    #[async_trait]
    impl FormatConverter for FixedDuration {
        async fn convert(&self, _source: &Path, dest_dir: &Path) -> Result<PathBuf> {
            Ok(dest_dir.join("audio.wav"))
        }

        async fn duration(&self, _path: &Path) -> Result<f64> {
            Ok(self.0)
        }

        async fn slice(&self, _source: &Path, dest: &Path, _start: f64, _length: f64) -> Result<()> {
            std::fs::write(dest, b"RIFF")?;
            Ok(())
        }
    }

    /// Recognizer that replays scripted outcomes.
    struct Scripted(Mutex<Vec<Result<Recognition>>>);

    #[async_trait]
    impl SpeechRecognizer for Scripted {
        async fn recognize(&self, chunk: &Path) -> Result<Recognition> {
            assert!(chunk.exists(), "chunk must exist while being recognized");
            self.0.lock().unwrap().remove(0)
        }
    }

    #[test]
    fn test_chunk_bounds() {
        assert_eq!(
            chunk_bounds(75.0, 30.0),
            vec![(0.0, 30.0), (30.0, 60.0), (60.0, 75.0)]
        );
        assert_eq!(chunk_bounds(30.0, 30.0), vec![(0.0, 30.0)]);
        assert!(chunk_bounds(0.0, 30.0).is_empty());
    }

    #[test]
    fn test_chunk_bounds_merges_short_tail() {
        // Encoder padding reports a few extra milliseconds
        assert_eq!(
            chunk_bounds(60.023, 30.0),
            vec![(0.0, 30.0), (30.0, 60.023)]
        );
        assert_eq!(chunk_bounds(30.6, 30.0).len(), 2);
        assert!(chunk_bounds(0.2, 30.0).is_empty());
    }

    #[test]
    fn test_progress_hidden_by_default() {
        let recognizer = ChunkedSpeechRecognizer::new(
            Arc::new(FixedDuration(10.0)),
            Arc::new(Scripted(Mutex::new(vec![]))),
            30.0,
        );
        assert!(recognizer.progress_bar(3).is_hidden());
    }

    #[tokio::test]
    async fn test_padded_duration_makes_no_extra_request() {
        let scratch = tempfile::tempdir().unwrap();
        let recognizer = ChunkedSpeechRecognizer::new(
            Arc::new(FixedDuration(60.023)),
            Arc::new(Scripted(Mutex::new(vec![
                Ok(Recognition::Text("first".to_string())),
                Ok(Recognition::Text("second".to_string())),
            ]))),
            30.0,
        );

        let segments = recognizer
            .transcribe(&scratch.path().join("audio.wav"), scratch.path())
            .await
            .unwrap();

        assert_eq!(
            segments,
            vec![
                RawSegment::new(0.0, 30.0, "first"),
                RawSegment::new(30.0, 60.023, "second"),
            ]
        );
    }

    #[tokio::test]
    async fn test_unintelligible_chunk_does_not_abort() {
        let scratch = tempfile::tempdir().unwrap();
        let recognizer = ChunkedSpeechRecognizer::new(
            Arc::new(FixedDuration(50.0)),
            Arc::new(Scripted(Mutex::new(vec![
                Ok(Recognition::Unrecognized),
                Ok(Recognition::Text("a path graph".to_string())),
            ]))),
            30.0,
        );

        let segments = recognizer
            .transcribe(&scratch.path().join("audio.wav"), scratch.path())
            .await
            .unwrap();

        assert_eq!(
            segments,
            vec![
                RawSegment::new(0.0, 30.0, UNINTELLIGIBLE),
                RawSegment::new(30.0, 50.0, "a path graph"),
            ]
        );
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_service_failure_is_fatal() {
        let scratch = tempfile::tempdir().unwrap();
        let recognizer = ChunkedSpeechRecognizer::new(
            Arc::new(FixedDuration(90.0)),
            Arc::new(Scripted(Mutex::new(vec![
                Ok(Recognition::Text("first".to_string())),
                Err(ClipquizError::OpenAI("503".to_string())),
            ]))),
            30.0,
        );

        let err = recognizer
            .transcribe(&scratch.path().join("audio.wav"), scratch.path())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ClipquizError::Acquisition(AcquisitionFailure::RecognitionService(_))
        ));
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_audio_is_conversion_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let recognizer = ChunkedSpeechRecognizer::new(
            Arc::new(FixedDuration(0.0)),
            Arc::new(Scripted(Mutex::new(vec![]))),
            30.0,
        );

        let err = recognizer
            .transcribe(&scratch.path().join("audio.wav"), scratch.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClipquizError::Acquisition(AcquisitionFailure::Conversion(_))
        ));
    }
}
