//! Fixed-duration windowing of raw transcript segments.

use super::{HeuristicLabeler, TranscriptWindow};
use crate::transcription::RawSegment;

/// Merges raw segments into windows of a nominal duration.
///
/// A window grows past its nominal end when a segment crosses it, so no
/// segment is ever split; the next window starts at the extended boundary.
/// The final window ends with its last segment.
#[derive(Debug, Clone)]
pub struct Segmenter {
    window_seconds: f64,
    labeler: HeuristicLabeler,
}

/// Text accumulated for the window being built.
struct OpenWindow {
    start: f64,
    end: f64,
    /// Latest end of any segment added so far.
    content_end: f64,
    parts: Vec<String>,
}

impl OpenWindow {
    fn new(start: f64, length: f64) -> Self {
        Self {
            start,
            end: start + length,
            content_end: start,
            parts: Vec::new(),
        }
    }

    fn text(&self) -> String {
        self.parts.join(" ").trim().to_string()
    }
}

impl Segmenter {
    pub fn new(window_seconds: f64) -> Self {
        Self {
            window_seconds,
            labeler: HeuristicLabeler::new(),
        }
    }

    /// Turn ordered raw segments into labeled windows pointing at `video_url`.
    pub fn segment(&self, segments: &[RawSegment], video_url: &str) -> Vec<TranscriptWindow> {
        let mut windows = Vec::new();
        let mut current = OpenWindow::new(0.0, self.window_seconds);

        for segment in segments {
            if segment.start >= current.end {
                let next_start = current.end;
                self.close(&current, video_url, &mut windows);

                current = OpenWindow::new(next_start, self.window_seconds);
                // Skip over gaps without emitting empty windows
                while segment.start >= current.end {
                    current = OpenWindow::new(current.end, self.window_seconds);
                }
            }

            let text = segment.text.trim();
            if !text.is_empty() {
                current.parts.push(text.to_string());
            }
            current.content_end = current.content_end.max(segment.end);

            if segment.end > current.end {
                current.end = segment.end;
            }
        }

        current.end = current.content_end.min(current.end);
        self.close(&current, video_url, &mut windows);
        windows
    }

    /// Label and emit `window` unless it holds no text.
    fn close(&self, window: &OpenWindow, video_url: &str, out: &mut Vec<TranscriptWindow>) {
        let text = window.text();
        if text.is_empty() {
            return;
        }

        let label = self.labeler.label(&text);
        out.push(TranscriptWindow {
            start_time: window.start,
            end_time: window.end,
            text,
            title: label.title,
            video_url: video_url.to_string(),
            description: label.description,
        });
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://youtu.be/ABC123?feature=shared";

    fn spans(windows: &[TranscriptWindow]) -> Vec<(f64, f64, &str)> {
        windows
            .iter()
            .map(|w| (w.start_time, w.end_time, w.text.as_str()))
            .collect()
    }

    #[test]
    fn test_crossing_segment_extends_window() {
        let segments = vec![
            RawSegment::from_caption(0.0, 10.0, "a"),
            RawSegment::from_caption(10.0, 15.0, "b"),
            RawSegment::from_caption(25.0, 10.0, "c"),
            RawSegment::from_caption(36.0, 4.0, "d"),
        ];

        let windows = Segmenter::new(30.0).segment(&segments, URL);

        assert_eq!(spans(&windows), vec![(0.0, 35.0, "a b c"), (35.0, 40.0, "d")]);
    }

    #[test]
    fn test_segment_starting_inside_extension_stays_in_window() {
        let segments = vec![
            RawSegment::from_caption(25.0, 10.0, "c"),
            RawSegment::from_caption(32.0, 2.0, "tail"),
        ];

        let windows = Segmenter::new(30.0).segment(&segments, URL);

        assert_eq!(spans(&windows), vec![(0.0, 35.0, "c tail")]);
    }

    #[test]
    fn test_regular_windows() {
        let segments: Vec<RawSegment> = (0..7)
            .map(|i| RawSegment::from_caption(i as f64 * 10.0, 10.0, format!("s{i}")))
            .collect();

        let windows = Segmenter::new(30.0).segment(&segments, URL);

        assert_eq!(
            spans(&windows),
            vec![
                (0.0, 30.0, "s0 s1 s2"),
                (30.0, 60.0, "s3 s4 s5"),
                (60.0, 70.0, "s6"),
            ]
        );
    }

    #[test]
    fn test_gaps_do_not_emit_empty_windows() {
        let segments = vec![
            RawSegment::from_caption(0.0, 5.0, "early"),
            RawSegment::from_caption(95.0, 5.0, "late"),
        ];

        let windows = Segmenter::new(30.0).segment(&segments, URL);

        assert_eq!(spans(&windows), vec![(0.0, 30.0, "early"), (90.0, 100.0, "late")]);
    }

    #[test]
    fn test_windows_are_ordered_and_disjoint() {
        let segments = vec![
            RawSegment::from_caption(0.0, 40.0, "long"),
            RawSegment::from_caption(41.0, 30.0, "longer"),
            RawSegment::from_caption(80.0, 2.0, "short"),
            RawSegment::from_caption(140.0, 3.0, "end"),
        ];

        let windows = Segmenter::new(30.0).segment(&segments, URL);

        for pair in windows.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time);
            assert!(pair[0].start_time < pair[1].start_time);
        }
        assert_eq!(windows.len(), 4);
    }

    #[test]
    fn test_segmentation_is_pure() {
        let segments = vec![
            RawSegment::from_caption(0.0, 12.0, "This video introduces graphs"),
            RawSegment::from_caption(31.0, 40.0, "a star graph visualization"),
        ];
        let segmenter = Segmenter::default();

        let first = segmenter.segment(&segments, URL);
        let second = segmenter.segment(&segments, URL);

        assert_eq!(first, second);
        assert_eq!(first[0].title, "Introduction");
        assert_eq!(first[1].title, "Star Graph Visualization");
        assert_eq!(first[1].video_url, URL);
    }

    #[test]
    fn test_empty_input_yields_no_windows() {
        assert!(Segmenter::default().segment(&[], URL).is_empty());
    }
}
