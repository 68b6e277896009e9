/*!
 * Chapter computation and embedding.
 *
 * Chapter boundaries are the cumulative sum of segment durations: one
 * chapter per segment, contiguous and non-overlapping, the last ending at
 * the total assembled duration. The table is embedded as ID3v2 CHAP frames
 * plus a single top-level CTOC frame referencing every chapter in order.
 *
 * Embedding is strictly cosmetic: callers log failures as warnings and
 * keep the assembled file exactly as it is.
 */

use anyhow::{Context, Result};
use id3::frame::{Chapter as ChapFrame, Content, Frame, TableOfContents};
use id3::{Tag, TagLike, Version};
use std::path::Path;

use super::AudioSegment;

/// A named time range within an episode's audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Chapter display title
    pub title: String,

    /// Start offset in milliseconds
    pub start_ms: u64,

    /// End offset in milliseconds
    pub end_ms: u64,
}

/// Compute the chapter table for an ordered segment list
///
/// Chapter i ends exactly where chapter i+1 starts; chapter 0 always
/// covers the narration segment.
pub fn compute_chapters(segments: &[AudioSegment]) -> Vec<Chapter> {
    let mut chapters = Vec::with_capacity(segments.len());
    let mut cursor = 0u64;

    for segment in segments {
        let end = cursor + segment.duration_ms;
        chapters.push(Chapter {
            title: segment.title.clone(),
            start_ms: cursor,
            end_ms: end,
        });
        cursor = end;
    }

    chapters
}

/// Embed a chapter table into a file's ID3v2 metadata
///
/// Writes one CHAP frame per chapter and one ordered top-level CTOC frame
/// referencing them all. Existing non-chapter frames are preserved.
pub fn embed_chapters(path: &Path, chapters: &[Chapter]) -> Result<()> {
    let mut tag = Tag::read_from_path(path).unwrap_or_else(|_| Tag::new());

    let mut element_ids = Vec::with_capacity(chapters.len());
    for (idx, chapter) in chapters.iter().enumerate() {
        let element_id = format!("chp{}", idx);
        tag.add_frame(ChapFrame {
            element_id: element_id.clone(),
            start_time: chapter.start_ms as u32,
            end_time: chapter.end_ms as u32,
            // Offsets unused; players fall back to the time fields
            start_offset: u32::MAX,
            end_offset: u32::MAX,
            frames: vec![Frame::with_content(
                "TIT2",
                Content::Text(chapter.title.clone()),
            )],
        });
        element_ids.push(element_id);
    }

    tag.add_frame(TableOfContents {
        element_id: "toc".to_string(),
        top_level: true,
        ordered: true,
        elements: element_ids,
        frames: Vec::new(),
    });

    tag.write_to_path(path, Version::Id3v24)
        .with_context(|| format!("Failed to write chapter frames to {:?}", path))?;

    Ok(())
}

/// Compute and embed chapters for a multi-segment episode
///
/// Single-segment episodes are skipped entirely (a table of contents with
/// one entry is not meaningful). Returns the computed table either way so
/// the feed can carry it.
pub fn mark_episode(path: &Path, segments: &[AudioSegment]) -> (Vec<Chapter>, Result<()>) {
    let chapters = compute_chapters(segments);

    if segments.len() < 2 {
        return (chapters, Ok(()));
    }

    let outcome = embed_chapters(path, &chapters);
    (chapters, outcome)
}
