//! Audio download and processing.
//!
//! Wraps the external tools used by the fallback chain: yt-dlp for downloads,
//! ffmpeg/ffprobe for conversion, probing and slicing.

mod converter;
mod downloader;

pub use converter::{FfmpegConverter, FormatConverter};
pub use downloader::{AudioDownloader, YtDlpDownloader};

use crate::error::{ClipquizError, Result};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Run an external tool to completion within `timeout`.
///
/// The child is killed if the timeout elapses or the calling future is dropped.
/// A non-zero exit status becomes [`ClipquizError::ToolFailed`] carrying stderr.
pub(crate) async fn run_tool(mut command: Command, tool: &str, timeout: Duration) -> Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ClipquizError::ToolNotFound(tool.to_string()));
        }
        Ok(Err(e)) => {
            return Err(ClipquizError::ToolFailed(format!("{tool} execution failed: {e}")));
        }
        Err(_) => {
            return Err(ClipquizError::Timeout {
                operation: tool.to_string(),
                seconds: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClipquizError::ToolFailed(format!(
            "{tool} failed: {}",
            stderr.trim()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let command = Command::new("clipquiz-definitely-not-a-real-tool");
        let err = run_tool(command, "clipquiz-definitely-not-a-real-tool", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ClipquizError::ToolNotFound(_)));
    }
}
