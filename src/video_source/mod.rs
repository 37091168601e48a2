//! Video sources: URL identification and caption retrieval.

mod captions;
mod youtube;

pub use captions::{parse_json3, CaptionFetcher, YtDlpCaptionFetcher};
pub use youtube::{share_url, VideoIdentifier, VideoReference};
