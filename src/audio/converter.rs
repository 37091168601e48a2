//! Waveform conversion, probing and slicing via ffmpeg/ffprobe.

use super::run_tool;
use crate::error::{ClipquizError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// File name of the canonical waveform inside the scratch directory.
const WAVEFORM_NAME: &str = "audio.wav";

/// Re-encodes downloaded audio into the canonical waveform and cuts it up.
#[async_trait]
pub trait FormatConverter: Send + Sync {
    /// Convert `source` to a mono 16-bit PCM WAV inside `dest_dir`.
    async fn convert(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf>;

    /// Duration of an audio file in seconds.
    async fn duration(&self, path: &Path) -> Result<f64>;

    /// Write `length` seconds of `source` starting at `start` to `dest`.
    async fn slice(&self, source: &Path, dest: &Path, start: f64, length: f64) -> Result<()>;
}

/// ffmpeg based converter.
pub struct FfmpegConverter {
    sample_rate: u32,
    timeout: Duration,
}

impl FfmpegConverter {
    pub fn new(sample_rate: u32, timeout: Duration) -> Self {
        Self {
            sample_rate,
            timeout,
        }
    }
}

#[async_trait]
impl FormatConverter for FfmpegConverter {
    #[instrument(skip(self, dest_dir), fields(source = %source.display()))]
    async fn convert(&self, source: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let dest = dest_dir.join(WAVEFORM_NAME);
        debug!("Converting {:?} to WAV", source);

        let mut command = Command::new("ffmpeg");
        command
            .arg("-y")
            .arg("-i").arg(source)
            .arg("-vn")
            .arg("-acodec").arg("pcm_s16le")
            .arg("-ar").arg(self.sample_rate.to_string())
            .arg("-ac").arg("1")
            .arg("-loglevel").arg("error")
            .arg(&dest);

        run_tool(command, "ffmpeg", self.timeout).await?;
        Ok(dest)
    }

    async fn duration(&self, path: &Path) -> Result<f64> {
        let mut command = Command::new("ffprobe");
        command
            .arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_format")
            .arg(path);

        let output = run_tool(command, "ffprobe", self.timeout).await?;
        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    async fn slice(&self, source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
        let mut command = Command::new("ffmpeg");
        command
            .arg("-y")
            .arg("-ss").arg(format!("{:.3}", start))
            .arg("-i").arg(source)
            .arg("-t").arg(format!("{:.3}", length))
            .arg("-acodec").arg("pcm_s16le")
            .arg("-loglevel").arg("error")
            .arg(dest);

        run_tool(command, "ffmpeg", self.timeout).await?;
        Ok(())
    }
}

/// Extract `format.duration` from ffprobe JSON output.
fn parse_probe_duration(json_str: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|_| ClipquizError::ToolFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| ClipquizError::ToolFailed("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{"format": {"filename": "audio.wav", "duration": "95.432000"}}"#;
        assert_eq!(parse_probe_duration(json).unwrap(), 95.432);
    }

    #[test]
    fn test_parse_probe_duration_missing() {
        assert!(parse_probe_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_probe_duration("not json").is_err());
    }
}
