//! YouTube video identification.

use crate::error::{ClipquizError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// A video URL together with the id resolved from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    /// The URL as supplied by the caller.
    pub url: String,
    /// Canonical video id.
    pub video_id: String,
}

impl VideoReference {
    /// Canonical watch page, the form yt-dlp accepts for every input shape.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }

    /// Short share link for this video.
    pub fn share_url(&self) -> String {
        share_url(&self.video_id)
    }
}

/// Short share link for a video id.
pub fn share_url(video_id: &str) -> String {
    format!("https://youtu.be/{}?feature=shared", video_id)
}

/// Extracts canonical video ids from the accepted URL shapes.
pub struct VideoIdentifier {
    path_regex: Regex,
}

impl VideoIdentifier {
    pub fn new() -> Self {
        // Short links, embeds and shorts carry the id as the next path component
        let path_regex = Regex::new(
            r"(?x)
            (?:youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/)
            ([A-Za-z0-9_-]+)
        ",
        )
        .expect("Invalid regex");

        Self { path_regex }
    }

    /// Resolve a URL into a [`VideoReference`].
    pub fn identify(&self, input: &str) -> Result<VideoReference> {
        let video_id = self
            .extract_video_id(input)
            .ok_or_else(|| ClipquizError::InvalidUrl(input.to_string()))?;

        Ok(VideoReference {
            url: input.to_string(),
            video_id,
        })
    }

    /// Extract the video id: the `v` query parameter wins, then known path shapes.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(id) = query_video_id(input) {
            return Some(id);
        }

        self.path_regex
            .captures(input)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for VideoIdentifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the `v` query parameter, tolerating inputs without a scheme.
fn query_video_id(input: &str) -> Option<String> {
    let parsed = Url::parse(input)
        .or_else(|_| Url::parse(&format!("https://{}", input)))
        .ok()?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}
