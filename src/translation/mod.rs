/*!
 * Text chunking and translation.
 *
 * This module splits oversized article text into bounded chunks at natural
 * boundaries and translates each chunk independently through a pluggable
 * back end, reassembling the output:
 * - `chunker`: budget constants and the boundary-search splitting algorithm
 * - `service`: the translator with its same-language gate and fallback
 */

pub mod chunker;
pub mod service;

pub use chunker::{TextChunk, chunk_text, chunk_text_with_budget, truncate_to_budget};
pub use chunker::{BOUNDARY_WINDOW, CHUNK_CHAR_BUDGET, MAX_CHUNKS, MAX_TRANSLATION_CHARS};
pub use service::Translator;
