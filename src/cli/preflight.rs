//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{ClipquizError, Result};
use std::process::Command;

/// Tools the audio fallback depends on.
pub const REQUIRED_TOOLS: &[&str] = &["yt-dlp", "ffmpeg", "ffprobe"];

/// Run pre-flight checks for running the pipeline.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(settings: &Settings) -> Result<()> {
    check_api_key(&settings.completion.api_key_env)?;
    for tool in REQUIRED_TOOLS {
        check_tool(tool)?;
    }
    Ok(())
}

/// Check that the configured API key variable is set.
pub fn check_api_key(env_var: &str) -> Result<()> {
    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(ClipquizError::Config(format!(
            "{env_var} is empty. Set it with: export {env_var}='...'"
        ))),
        Err(_) => Err(ClipquizError::Config(format!(
            "{env_var} not set. Set it with: export {env_var}='...'"
        ))),
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(ClipquizError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ClipquizError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(ClipquizError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

/// ffmpeg/ffprobe use -version (single dash), others use --version
pub fn version_arg(name: &str) -> &'static str {
    match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    }
}
