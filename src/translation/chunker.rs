/*!
 * Text chunking for size-limited translation requests.
 *
 * Translation services cap the characters accepted per request, so long
 * article bodies are split into a bounded number of roughly equal chunks.
 * Cuts prefer natural boundaries (sentence punctuation, whitespace) found
 * inside a search window around the ideal split point, and the final chunk
 * absorbs whatever remains.
 */

use std::ops::Range;

/// Maximum characters a single translation request may carry
pub const CHUNK_CHAR_BUDGET: usize = 4900;

/// Maximum number of chunks translated per article
pub const MAX_CHUNKS: usize = 4;

/// Total character budget for one article; text beyond it is truncated
pub const MAX_TRANSLATION_CHARS: usize = MAX_CHUNKS * CHUNK_CHAR_BUDGET;

/// Half-width of the search window around an ideal chunk boundary
pub const BOUNDARY_WINDOW: usize = 100;

/// One bounded piece of a larger text
///
/// Chunks partition the (possibly truncated) source text without overlap;
/// `range` holds character positions, not byte offsets.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// Ordered position of the chunk within its text
    pub index: usize,

    /// Character range of the source text this chunk covers
    pub range: Range<usize>,

    /// The chunk's slice of the source text
    pub text: String,

    /// Translated text, None until translation runs
    pub translated: Option<String>,
}

/// Whether a character is acceptable as a chunk boundary
pub fn is_boundary_char(c: char) -> bool {
    matches!(c, '\n' | '.' | '!' | '?' | ' ')
}

/// Truncate text to the total translation budget, on a character boundary
pub fn truncate_to_budget(text: &str) -> &str {
    match text.char_indices().nth(MAX_TRANSLATION_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Split text into chunks under the standard per-request budget
pub fn chunk_text(text: &str) -> Vec<TextChunk> {
    chunk_text_with_budget(text, CHUNK_CHAR_BUDGET)
}

/// Split text into ceil(len / budget) chunks of roughly equal size
///
/// Each cut index is chosen inside the boundary window around the ideal
/// split point, preferring the in-window boundary character closest to the
/// ideal; when the window holds no acceptable character the cut falls back
/// to the ideal index exactly. The window shrinks for small budgets so
/// consecutive cuts can never cross.
pub fn chunk_text_with_budget(text: &str, budget: usize) -> Vec<TextChunk> {
    assert!(budget > 0, "chunk budget must be positive");

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    if total == 0 {
        return Vec::new();
    }

    let count = total.div_ceil(budget);
    if count == 1 {
        return vec![TextChunk {
            index: 0,
            range: 0..total,
            text: text.to_string(),
            translated: None,
        }];
    }

    let window = BOUNDARY_WINDOW.min(budget / 4).max(1);
    let mut chunks = Vec::with_capacity(count);
    let mut start = 0usize;

    for i in 1..count {
        let ideal = total * i / count;
        let cut = choose_cut(&chars, ideal, window, start + 1, total - 1);
        chunks.push(make_chunk(chunks.len(), start..cut, &chars));
        start = cut;
    }
    chunks.push(make_chunk(chunks.len(), start..total, &chars));

    chunks
}

/// Pick the cut index for one ideal boundary
///
/// Candidates are positions whose character is a boundary character and
/// which lie within `window` of `ideal`; the winner minimizes the distance
/// to the ideal point and the cut lands just after it so punctuation stays
/// with the preceding chunk. Falls back to the ideal index itself.
fn choose_cut(chars: &[char], ideal: usize, window: usize, min: usize, max: usize) -> usize {
    let lo = ideal.saturating_sub(window).max(min.saturating_sub(1));
    let hi = (ideal + window).min(max.saturating_sub(1));

    let mut best: Option<usize> = None;
    for pos in lo..=hi {
        if !is_boundary_char(chars[pos]) {
            continue;
        }
        let dist = pos.abs_diff(ideal);
        match best {
            Some(current) if pos.abs_diff(ideal) >= current.abs_diff(ideal) => {}
            _ => best = Some(pos),
        }
        // Candidates at the ideal itself cannot be beaten
        if dist == 0 {
            break;
        }
    }

    match best {
        Some(pos) => (pos + 1).clamp(min, max),
        None => ideal.clamp(min, max),
    }
}

fn make_chunk(index: usize, range: Range<usize>, chars: &[char]) -> TextChunk {
    let text: String = chars[range.clone()].iter().collect();
    TextChunk {
        index,
        range,
        text,
        translated: None,
    }
}
