//! Configuration settings for Clipquiz.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub completion: CompletionSettings,
    pub transcription: TranscriptionSettings,
    pub captions: CaptionSettings,
    pub segmentation: SegmentationSettings,
    pub generation: GenerationSettings,
    pub timeouts: TimeoutSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Root directory under which per-request scratch directories are created.
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/clipquiz".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            allowed_origins: vec!["http://localhost:4000".to_string()],
        }
    }
}

/// Completion service settings. Any OpenAI-compatible endpoint works
/// (e.g. `https://api.groq.com/openai/v1`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Chat model used for generation, review and classification.
    pub model: String,
    /// HTTP timeout for a single API request.
    pub timeout_seconds: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Speech recognition settings for the audio fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Audio transcription model.
    pub model: String,
    /// Length of each recognized audio chunk in seconds.
    pub chunk_seconds: u32,
    /// Sample rate of the canonical waveform.
    pub sample_rate: u32,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            chunk_seconds: 30,
            sample_rate: 16_000,
        }
    }
}

/// Caption fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionSettings {
    /// Caption language code.
    pub language: String,
    /// Optional cookies file passed to yt-dlp for restricted videos.
    pub cookies_file: Option<String>,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            cookies_file: None,
        }
    }
}

/// Transcript windowing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationSettings {
    /// Nominal window length in seconds.
    pub window_seconds: f64,
}

impl Default for SegmentationSettings {
    fn default() -> Self {
        Self { window_seconds: 30.0 }
    }
}

/// Router strategy for picking a question archetype.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RouterKind {
    /// Always multiple-choice.
    #[default]
    Fixed,
    /// Ask the completion service to classify the window.
    Classifier,
}

impl std::str::FromStr for RouterKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(RouterKind::Fixed),
            "classifier" => Ok(RouterKind::Classifier),
            _ => Err(format!("Unknown router: {}", s)),
        }
    }
}

impl std::fmt::Display for RouterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterKind::Fixed => write!(f, "fixed"),
            RouterKind::Classifier => write!(f, "classifier"),
        }
    }
}

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Question generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub router: RouterKind,
    /// Generate-validate-review cycles allowed per window.
    pub max_attempts: u32,
    /// Keep the last syntactically valid question of a rejected window.
    pub include_best_effort: bool,
    pub generator: SamplingSettings,
    pub reviewer: SamplingSettings,
    pub classifier: SamplingSettings,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            router: RouterKind::Fixed,
            max_attempts: 3,
            include_best_effort: false,
            generator: SamplingSettings {
                max_tokens: 300,
                temperature: 0.7,
            },
            reviewer: SamplingSettings {
                max_tokens: 200,
                temperature: 1.0,
            },
            classifier: SamplingSettings {
                max_tokens: 50,
                temperature: 0.0,
            },
        }
    }
}

/// Bounds on external calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Upper bound for any subprocess or recognition call.
    pub external_call_seconds: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            external_call_seconds: 600,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory holding a `questions.toml` that overrides the default templates.
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::ClipquizError;

        if self.generation.max_attempts == 0 {
            return Err(ClipquizError::Config(
                "generation.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.segmentation.window_seconds > 0.0) {
            return Err(ClipquizError::Config(
                "segmentation.window_seconds must be positive".to_string(),
            ));
        }
        if self.transcription.chunk_seconds == 0 {
            return Err(ClipquizError::Config(
                "transcription.chunk_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ClipquizError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipquiz")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Timeout applied to external calls.
    pub fn external_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeouts.external_call_seconds)
    }
}
