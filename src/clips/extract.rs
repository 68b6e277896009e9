/*!
 * Clip source extraction and canonicalization.
 *
 * The same video appears in markup under several URL spellings: the watch
 * page, the youtu.be short link, and the iframe embed form. All three
 * resolve to the 11-character video identifier, and duplicates collapse on
 * that key while preserving first-seen order.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// One canonicalized external clip reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSource {
    /// Extracted video identifier
    pub id: String,

    /// Canonical watch-page URL
    pub url: String,
}

impl ClipSource {
    /// Build a source from a bare video identifier
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let url = format!("https://www.youtube.com/watch?v={}", id);
        Self { id, url }
    }
}

/// The three recognized URL shapes, each capturing the video identifier
static CLIP_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:",
        r#"youtube\.com/watch\?(?:[^\s"'<>]*&(?:amp;)?)?v="#,
        r"|youtu\.be/",
        r"|youtube\.com/embed/",
        r")([A-Za-z0-9_-]{11})",
    ))
    .expect("static regex")
});

/// Scan raw markup for embedded clip references
///
/// Returns a deduplicated list in markup discovery order; each entry is
/// keyed by its extracted identifier so different spellings of the same
/// video collapse into one.
pub fn extract_clip_sources(markup: &str) -> Vec<ClipSource> {
    let mut seen = std::collections::HashSet::new();
    let mut sources = Vec::new();

    for capture in CLIP_URL.captures_iter(markup) {
        let id = capture[1].to_string();
        if seen.insert(id.clone()) {
            sources.push(ClipSource::from_id(id));
        }
    }

    sources
}
