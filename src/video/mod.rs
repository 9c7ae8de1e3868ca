//! YouTube URL parsing.

use std::sync::LazyLock;

use regex::Regex;

/// URL patterns checked in order; the first capture wins.
static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
            .expect("invalid watch/short/embed pattern"),
        Regex::new(r"youtube\.com/watch\?.*v=([^&\n?#]+)").expect("invalid watch query pattern"),
    ]
});

/// Extract the video id from a YouTube URL.
///
/// Supports the `watch?v=`, `youtu.be/` and `embed/` forms, including URLs
/// where `v=` is not the first query parameter. Returns `None` when the
/// string contains no recognizable video id.
pub fn resolve_video_id(url: &str) -> Option<String> {
    for pattern in VIDEO_ID_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(url) {
            if let Some(id) = captures.get(1) {
                return Some(id.as_str().to_string());
            }
        }
    }
    None
}
