//! Caption fetching via yt-dlp subtitle downloads.

use super::VideoReference;
use crate::audio::run_tool;
use crate::error::{ClipquizError, Result};
use crate::transcription::RawSegment;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

const CAPTION_STEM: &str = "captions";

/// Source of timestamped captions for a video.
#[async_trait]
pub trait CaptionFetcher: Send + Sync {
    /// Fetch captions, using `scratch` for any intermediate files.
    ///
    /// An error means captions are unavailable for this video.
    async fn fetch(&self, video: &VideoReference, scratch: &Path) -> Result<Vec<RawSegment>>;
}

/// Downloads manual or auto-generated subtitles in `json3` format.
pub struct YtDlpCaptionFetcher {
    language: String,
    cookies_file: Option<PathBuf>,
    timeout: Duration,
}

impl YtDlpCaptionFetcher {
    pub fn new(language: &str, cookies_file: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            language: language.to_string(),
            cookies_file,
            timeout,
        }
    }

    /// Find the subtitle file, preferring an exact language match.
    fn find_caption_file(&self, dir: &Path) -> Option<PathBuf> {
        let exact = dir.join(format!("{}.{}.json3", CAPTION_STEM, self.language));
        if exact.exists() {
            return Some(exact);
        }

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
            .ok()?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy())
                    .is_some_and(|n| n.starts_with(CAPTION_STEM) && n.ends_with(".json3"))
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

#[async_trait]
impl CaptionFetcher for YtDlpCaptionFetcher {
    #[instrument(skip(self, scratch), fields(video_id = %video.video_id))]
    async fn fetch(&self, video: &VideoReference, scratch: &Path) -> Result<Vec<RawSegment>> {
        let template = scratch.join(format!("{}.%(ext)s", CAPTION_STEM));

        let mut command = Command::new("yt-dlp");
        command
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(&self.language)
            .arg("--sub-format").arg("json3")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings");
        if let Some(cookies) = &self.cookies_file {
            command.arg("--cookies").arg(cookies);
        }
        command.arg(video.watch_url());

        run_tool(command, "yt-dlp", self.timeout)
            .await
            .map_err(|e| ClipquizError::Captions(e.to_string()))?;

        let path = self.find_caption_file(scratch).ok_or_else(|| {
            ClipquizError::Captions(format!("No '{}' captions available", self.language))
        })?;

        let content = tokio::fs::read_to_string(&path).await?;
        // The caption file has been consumed
        let _ = tokio::fs::remove_file(&path).await;

        let segments = parse_json3(&content)?;
        info!("Fetched {} caption segments", segments.len());
        Ok(segments)
    }
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    t_start_ms: Option<f64>,
    d_duration_ms: Option<f64>,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a YouTube `json3` caption document into raw segments.
///
/// Events without text (window definitions, bare line breaks) are dropped.
pub fn parse_json3(content: &str) -> Result<Vec<RawSegment>> {
    let document: Json3Document = serde_json::from_str(content)
        .map_err(|e| ClipquizError::Captions(format!("Malformed caption file: {e}")))?;

    let segments: Vec<RawSegment> = document
        .events
        .into_iter()
        .filter_map(|event| {
            let start = event.t_start_ms? / 1000.0;
            let duration = event.d_duration_ms.unwrap_or(0.0) / 1000.0;
            let text = event
                .segs
                .iter()
                .map(|s| s.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ");
            let text = text.trim();

            if text.is_empty() {
                return None;
            }
            Some(RawSegment::from_caption(start, duration, text))
        })
        .collect();

    debug!("Parsed {} caption events", segments.len());
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json3() {
        let content = r#"{
            "wireMagic": "pb3",
            "events": [
                {"tStartMs": 0, "dDurationMs": 120000, "id": 1, "wpWinPosId": 1},
                {"tStartMs": 0, "dDurationMs": 10000, "segs": [{"utf8": "hello "}, {"utf8": "world", "tOffsetMs": 400}]},
                {"tStartMs": 9000, "dDurationMs": 1000, "aAppend": 1, "segs": [{"utf8": "\n"}]},
                {"tStartMs": 10000, "dDurationMs": 15000, "segs": [{"utf8": "graphs\nare fun"}]}
            ]
        }"#;

        let segments = parse_json3(content).unwrap();
        assert_eq!(
            segments,
            vec![
                RawSegment::new(0.0, 10.0, "hello world"),
                RawSegment::new(10.0, 25.0, "graphs are fun"),
            ]
        );
    }

    #[test]
    fn test_parse_json3_rejects_garbage() {
        let err = parse_json3("<transcript/>").unwrap_err();
        assert!(matches!(err, ClipquizError::Captions(_)));
    }

    #[test]
    fn test_find_caption_file_prefers_exact_language() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("captions.en-orig.json3"), "{}").unwrap();
        std::fs::write(dir.path().join("captions.en.json3"), "{}").unwrap();

        let fetcher = YtDlpCaptionFetcher::new("en", None, Duration::from_secs(1));
        assert_eq!(
            fetcher.find_caption_file(dir.path()),
            Some(dir.path().join("captions.en.json3"))
        );
    }
}
