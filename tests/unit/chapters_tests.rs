/*!
 * Tests for chapter computation and ID3 embedding
 */

use anyhow::Result;
use id3::frame::Content;
use id3::{Tag, TagLike};
use std::path::PathBuf;

use readcast::audio::chapters::mark_episode;
use readcast::audio::{AudioSegment, SegmentKind, compute_chapters, embed_chapters};

use crate::common::{create_temp_dir, create_test_file};

fn segment(ordinal: usize, duration_ms: u64, title: &str) -> AudioSegment {
    AudioSegment {
        kind: if ordinal == 0 {
            SegmentKind::Narration
        } else {
            SegmentKind::ExternalClip
        },
        path: PathBuf::from(format!("seg{}.mp3", ordinal)),
        duration_ms,
        ordinal,
        title: title.to_string(),
    }
}

#[test]
fn test_compute_chapters_withThreeSegments_shouldBeContiguous() {
    let segments = vec![
        segment(0, 5000, "Narration"),
        segment(1, 3000, "Clip 1"),
        segment(2, 2000, "Clip 2"),
    ];

    let chapters = compute_chapters(&segments);
    assert_eq!(chapters.len(), 3);

    // Chapter 0 is the narration segment
    assert_eq!(chapters[0].title, "Narration");
    assert_eq!(chapters[0].start_ms, 0);
    assert_eq!(chapters[0].end_ms, 5000);

    // Contiguous, non-overlapping, monotonically non-decreasing
    for pair in chapters.windows(2) {
        assert_eq!(pair[0].end_ms, pair[1].start_ms);
        assert!(pair[0].start_ms <= pair[1].start_ms);
    }

    // The last chapter ends at the total duration
    assert_eq!(chapters[2].end_ms, 10000);
}

#[test]
fn test_compute_chapters_withNoSegments_shouldBeEmpty() {
    assert!(compute_chapters(&[]).is_empty());
}

#[test]
fn test_embed_chapters_withThreeChapters_shouldWriteChapAndCtocFrames() -> Result<()> {
    let dir = create_temp_dir()?;
    let file = create_test_file(dir.path(), "episode.mp3", &vec![0u8; 4096])?;

    let segments = vec![
        segment(0, 5000, "Intro"),
        segment(1, 3000, "Clip 1"),
        segment(2, 2000, "Clip 2"),
    ];
    let chapters = compute_chapters(&segments);
    embed_chapters(&file, &chapters)?;

    let tag = Tag::read_from_path(&file)?;
    let read_back: Vec<_> = tag
        .frames()
        .filter_map(|f| match f.content() {
            Content::Chapter(chapter) => Some(chapter),
            _ => None,
        })
        .collect();
    assert_eq!(read_back.len(), 3);

    let tocs: Vec<_> = tag
        .frames()
        .filter_map(|f| match f.content() {
            Content::TableOfContents(toc) => Some(toc),
            _ => None,
        })
        .collect();
    assert_eq!(tocs.len(), 1);
    assert!(tocs[0].top_level);
    assert!(tocs[0].ordered);
    assert_eq!(tocs[0].elements.len(), 3);

    Ok(())
}

#[test]
fn test_mark_episode_withSingleSegment_shouldSkipEmbedding() -> Result<()> {
    let dir = create_temp_dir()?;
    let file = create_test_file(dir.path(), "solo.mp3", &vec![0u8; 2048])?;
    let original = std::fs::read(&file)?;

    let segments = vec![segment(0, 5000, "Narration")];
    let (chapters, outcome) = mark_episode(&file, &segments);

    assert!(outcome.is_ok());
    assert_eq!(chapters.len(), 1);

    // The file is untouched: no tag was written
    assert_eq!(std::fs::read(&file)?, original);
    Ok(())
}

#[test]
fn test_mark_episode_withTwoSegments_shouldEmbed() -> Result<()> {
    let dir = create_temp_dir()?;
    let file = create_test_file(dir.path(), "duo.mp3", &vec![0u8; 2048])?;

    let segments = vec![segment(0, 4000, "Narration"), segment(1, 1000, "Clip 1")];
    let (chapters, outcome) = mark_episode(&file, &segments);

    assert!(outcome.is_ok());
    assert_eq!(chapters.len(), 2);

    let tag = Tag::read_from_path(&file)?;
    let chap_frames = tag
        .frames()
        .filter(|f| matches!(f.content(), Content::Chapter(_)))
        .count();
    assert_eq!(chap_frames, 2);
    Ok(())
}
