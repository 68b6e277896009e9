/*!
 * Article model and markup cleanup.
 *
 * Articles arrive from the source services as raw HTML. Narration needs a
 * plain-text rendition with scripts, styles and layout noise removed, while
 * clip extraction keeps working on the raw markup (embed tags live there).
 */

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// One article fetched from a read-it-later or RSS service
///
/// Immutable within the pipeline; `body` is derived from `raw_markup` once
/// at construction.
#[derive(Debug, Clone)]
pub struct Article {
    /// Source-side identifier
    pub id: String,

    /// Article title
    pub title: String,

    /// Raw HTML content as delivered by the source
    pub raw_markup: String,

    /// Plain-text body suitable for narration
    pub body: String,

    /// Language declared by the source configuration, if any
    pub declared_language: Option<String>,
}

impl Article {
    /// Build an article, deriving the plain-text body from the raw markup
    pub fn new(id: impl Into<String>, title: impl Into<String>, raw_markup: impl Into<String>) -> Self {
        let raw_markup = raw_markup.into();
        let body = clean_markup(&raw_markup);

        Self {
            id: id.into(),
            title: title.into(),
            raw_markup,
            body,
            declared_language: None,
        }
    }

    /// Attach the declared source language
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.declared_language = language;
        self
    }

    /// Whether the article has any narratable content
    pub fn has_content(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Elements whose text must never be narrated
static NON_CONTENT_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)\s*>")
        .expect("static regex")
});

/// Strip markup down to readable plain text
///
/// Script, style and noscript blocks are dropped wholly before parsing;
/// the remaining text nodes are joined and whitespace is collapsed so the
/// synthesizer never reads layout artifacts aloud.
pub fn clean_markup(markup: &str) -> String {
    let stripped = NON_CONTENT_BLOCKS.replace_all(markup, " ");
    let document = Html::parse_document(&stripped);

    let text: Vec<&str> = document.root_element().text().collect();
    text.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}
