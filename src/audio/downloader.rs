//! Audio download via yt-dlp.

use super::run_tool;
use crate::error::{ClipquizError, Result};
use crate::video_source::VideoReference;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Base name of the downloaded artifact inside the scratch directory.
const AUDIO_STEM: &str = "audio";

/// Fetches the best available audio track of a video.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download audio into `dest_dir` and return the artifact path.
    async fn download(&self, video: &VideoReference, dest_dir: &Path) -> Result<PathBuf>;
}

/// yt-dlp based downloader.
pub struct YtDlpDownloader {
    cookies_file: Option<PathBuf>,
    timeout: Duration,
}

impl YtDlpDownloader {
    pub fn new(cookies_file: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            cookies_file,
            timeout,
        }
    }

    /// The yt-dlp invocation that saves the audio track under `template`.
    fn command(&self, video: &VideoReference, template: &Path) -> Command {
        let mut command = Command::new("yt-dlp");
        command
            .arg("--format").arg("bestaudio/best")
            .arg("--output").arg(template)
            .arg("--print").arg("after_move:filepath")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings");
        if let Some(cookies) = &self.cookies_file {
            command.arg("--cookies").arg(cookies);
        }
        command.arg(video.watch_url());
        command
    }
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    #[instrument(skip(self, dest_dir), fields(video_id = %video.video_id))]
    async fn download(&self, video: &VideoReference, dest_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dest_dir)?;

        info!("Downloading audio from {}", video.watch_url());

        let template = dest_dir.join(format!("{}.%(ext)s", AUDIO_STEM));
        let command = self.command(video, &template);

        let output = run_tool(command, "yt-dlp", self.timeout).await?;

        let printed = String::from_utf8_lossy(&output.stdout);
        let printed = PathBuf::from(printed.trim());
        if printed.is_file() {
            debug!("Downloaded {:?}", printed);
            return Ok(printed);
        }

        find_audio_file(dest_dir, AUDIO_STEM)
    }
}

/// Locates a downloaded audio file by its stem.
fn find_audio_file(dir: &Path, stem: &str) -> Result<PathBuf> {
    // Common audio formats that yt-dlp may produce
    for ext in &["m4a", "webm", "opus", "mp3", "ogg"] {
        let candidate = dir.join(format!("{}.{}", stem, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fallback: scan directory for matching prefix
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ClipquizError::ToolFailed(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(stem) && !name.ends_with(".part") {
            return Ok(entry.path());
        }
    }

    Err(ClipquizError::ToolFailed("Audio file not found after download".into()))
}
