//! Transcript acquisition: captions first, audio transcription as fallback.
//!
//! Every acquisition runs inside its own scratch directory, removed when the
//! acquisition returns regardless of outcome.

use crate::audio::{AudioDownloader, FormatConverter};
use crate::error::{AcquisitionFailure, ClipquizError, Result};
use crate::transcription::{ChunkedSpeechRecognizer, Transcript, TranscriptSource};
use crate::video_source::{CaptionFetcher, VideoReference};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A per-request scratch directory, deleted on drop.
pub struct ScratchSpace {
    request_id: Uuid,
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a fresh scratch directory under `root`.
    pub fn create(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        let request_id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("req-{}-", request_id))
            .tempdir_in(root)?;
        Ok(Self { request_id, dir })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Acquires the raw transcript of a video.
pub struct TranscriptAcquirer {
    captions: Arc<dyn CaptionFetcher>,
    downloader: Arc<dyn AudioDownloader>,
    converter: Arc<dyn FormatConverter>,
    speech: ChunkedSpeechRecognizer,
    scratch_root: PathBuf,
    timeout: Duration,
}

impl TranscriptAcquirer {
    pub fn new(
        captions: Arc<dyn CaptionFetcher>,
        downloader: Arc<dyn AudioDownloader>,
        converter: Arc<dyn FormatConverter>,
        speech: ChunkedSpeechRecognizer,
        scratch_root: PathBuf,
        timeout: Duration,
    ) -> Self {
        Self {
            captions,
            downloader,
            converter,
            speech,
            scratch_root,
            timeout,
        }
    }

    /// Acquire a transcript, falling back to audio transcription when
    /// captions are unavailable.
    #[instrument(skip(self), fields(video_id = %video.video_id))]
    pub async fn acquire(&self, video: &VideoReference) -> Result<Transcript> {
        let scratch = ScratchSpace::create(&self.scratch_root)?;
        info!(request_id = %scratch.request_id(), "Acquiring transcript");

        let captions = bounded(
            self.timeout,
            "caption fetch",
            self.captions.fetch(video, scratch.path()),
        )
        .await;

        match captions {
            Ok(segments) if !segments.is_empty() => {
                info!("Using {} caption segments", segments.len());
                return Ok(Transcript::new(
                    video.video_id.clone(),
                    TranscriptSource::Captions,
                    segments,
                ));
            }
            Ok(_) => warn!("Caption track is empty, attempting audio transcription"),
            Err(e) => warn!("Transcript not available via captions ({}), attempting audio transcription", e),
        }

        let segments = self.transcribe_audio(video, scratch.path()).await?;
        Ok(Transcript::new(
            video.video_id.clone(),
            TranscriptSource::SpeechRecognition,
            segments,
        ))
    }

    /// Download → convert → recognize.
    async fn transcribe_audio(
        &self,
        video: &VideoReference,
        scratch: &Path,
    ) -> Result<Vec<crate::transcription::RawSegment>> {
        let audio = bounded(self.timeout, "audio download", self.downloader.download(video, scratch))
            .await
            .map_err(|e| acquisition_failure(e, AcquisitionFailure::Download))?;

        let waveform = bounded(self.timeout, "audio conversion", self.converter.convert(&audio, scratch))
            .await
            .map_err(|e| acquisition_failure(e, AcquisitionFailure::Conversion))?;

        // The downloaded artifact has been consumed
        if let Err(e) = tokio::fs::remove_file(&audio).await {
            warn!("Failed to remove downloaded audio: {}", e);
        }

        let segments = self.speech.transcribe(&waveform, scratch).await;

        if let Err(e) = tokio::fs::remove_file(&waveform).await {
            warn!("Failed to remove converted waveform: {}", e);
        }

        let segments = segments?;
        info!("Recognized {} audio chunks", segments.len());
        Ok(segments)
    }
}

/// Run `fut` with an upper bound on its duration.
async fn bounded<T, F>(timeout: Duration, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or_else(|_| {
            Err(ClipquizError::Timeout {
                operation: operation.to_string(),
                seconds: timeout.as_secs(),
            })
        })
}

/// Classify an error from a fallback step, keeping already-classified failures.
fn acquisition_failure(err: ClipquizError, kind: fn(String) -> AcquisitionFailure) -> ClipquizError {
    match err {
        ClipquizError::Acquisition(_) => err,
        other => kind(other.to_string()).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{RawSegment, Recognition, SpeechRecognizer};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Which step of the fallback chain should fail.
    #[derive(Clone, Copy, PartialEq)]
    enum FailAt {
        Nothing,
        Download,
        Convert,
        Recognize,
    }

    struct NoCaptions;

    #[async_trait]
    impl CaptionFetcher for NoCaptions {
        async fn fetch(&self, _video: &VideoReference, scratch: &Path) -> Result<Vec<RawSegment>> {
            // Leave a stray file behind, as a half-finished subtitle download would
            std::fs::write(scratch.join("captions.en.json3.part"), b"{")?;
            Err(ClipquizError::Captions("subtitles are disabled".to_string()))
        }
    }

    struct FixedCaptions(Vec<RawSegment>);

    #[async_trait]
    impl CaptionFetcher for FixedCaptions {
        async fn fetch(&self, _video: &VideoReference, _scratch: &Path) -> Result<Vec<RawSegment>> {
            Ok(self.0.clone())
        }
    }

    struct StubDownloader {
        fail_at: FailAt,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AudioDownloader for StubDownloader {
        async fn download(&self, _video: &VideoReference, dest_dir: &Path) -> Result<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_at == FailAt::Download {
                return Err(ClipquizError::ToolFailed("yt-dlp failed: HTTP 403".to_string()));
            }
            let path = dest_dir.join("audio.webm");
            std::fs::write(&path, b"webm")?;
            Ok(path)
        }
    }

    struct StubConverter {
        fail_at: FailAt,
    }

    #[async_trait]
    impl FormatConverter for StubConverter {
        async fn convert(&self, _source: &Path, dest_dir: &Path) -> Result<PathBuf> {
            let path = dest_dir.join("audio.wav");
            std::fs::write(&path, b"RIFF")?;
            if self.fail_at == FailAt::Convert {
                return Err(ClipquizError::ToolFailed("ffmpeg failed: invalid data".to_string()));
            }
            Ok(path)
        }

        async fn duration(&self, _path: &Path) -> Result<f64> {
            Ok(65.0)
        }

        async fn slice(&self, _source: &Path, dest: &Path, _start: f64, _length: f64) -> Result<()> {
            std::fs::write(dest, b"RIFF")?;
            Ok(())
        }
    }

    struct StubRecognizer {
        fail_at: FailAt,
    }

    #[async_trait]
    impl SpeechRecognizer for StubRecognizer {
        async fn recognize(&self, _chunk: &Path) -> Result<Recognition> {
            if self.fail_at == FailAt::Recognize {
                return Err(ClipquizError::OpenAI("connection reset".to_string()));
            }
            Ok(Recognition::Text("spoken words".to_string()))
        }
    }

    fn video() -> VideoReference {
        VideoReference {
            url: "https://youtu.be/ABC123".to_string(),
            video_id: "ABC123".to_string(),
        }
    }

    fn build_acquirer(
        captions: Arc<dyn CaptionFetcher>,
        fail_at: FailAt,
        root: &Path,
    ) -> (TranscriptAcquirer, Arc<StubDownloader>) {
        let downloader = Arc::new(StubDownloader {
            fail_at,
            calls: AtomicUsize::new(0),
        });
        let converter: Arc<dyn FormatConverter> = Arc::new(StubConverter { fail_at });
        let speech = ChunkedSpeechRecognizer::new(
            converter.clone(),
            Arc::new(StubRecognizer { fail_at }),
            30.0,
        );
        let acquirer = TranscriptAcquirer::new(
            captions,
            downloader.clone(),
            converter,
            speech,
            root.to_path_buf(),
            Duration::from_secs(5),
        );
        (acquirer, downloader)
    }

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_captions_skip_fallback() {
        let root = tempfile::tempdir().unwrap();
        let captions = Arc::new(FixedCaptions(vec![RawSegment::from_caption(0.0, 4.0, "hi")]));
        let (acquirer, downloader) = build_acquirer(captions, FailAt::Nothing, root.path());

        let transcript = acquirer.acquire(&video()).await.unwrap();

        assert_eq!(transcript.source, TranscriptSource::Captions);
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 0);
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_empty_captions_trigger_fallback() {
        let root = tempfile::tempdir().unwrap();
        let (acquirer, downloader) =
            build_acquirer(Arc::new(FixedCaptions(vec![])), FailAt::Nothing, root.path());

        let transcript = acquirer.acquire(&video()).await.unwrap();

        assert_eq!(transcript.source, TranscriptSource::SpeechRecognition);
        assert_eq!(downloader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_success_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let (acquirer, _) = build_acquirer(Arc::new(NoCaptions), FailAt::Nothing, root.path());

        let transcript = acquirer.acquire(&video()).await.unwrap();

        assert_eq!(transcript.source, TranscriptSource::SpeechRecognition);
        assert_eq!(
            transcript.segments,
            vec![
                RawSegment::new(0.0, 30.0, "spoken words"),
                RawSegment::new(30.0, 60.0, "spoken words"),
                RawSegment::new(60.0, 65.0, "spoken words"),
            ]
        );
        assert!(is_empty_dir(root.path()));
    }

    #[tokio::test]
    async fn test_every_failure_point_cleans_up() {
        let cases = [
            (FailAt::Download, "Error downloading audio"),
            (FailAt::Convert, "Error converting audio"),
            (FailAt::Recognize, "Error with the speech recognition service"),
        ];

        for (fail_at, message) in cases {
            let root = tempfile::tempdir().unwrap();
            let (acquirer, _) = build_acquirer(Arc::new(NoCaptions), fail_at, root.path());

            let err = acquirer.acquire(&video()).await.unwrap_err();

            assert!(matches!(err, ClipquizError::Acquisition(_)));
            assert!(err.to_string().starts_with(message), "got: {err}");
            assert!(is_empty_dir(root.path()));
        }
    }

    #[test]
    fn test_scratch_spaces_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchSpace::create(root.path()).unwrap();
        let b = ScratchSpace::create(root.path()).unwrap();

        assert_ne!(a.path(), b.path());
        assert_ne!(a.request_id(), b.request_id());

        let path = a.path().to_path_buf();
        drop(a);
        assert!(!path.exists());
    }
}
