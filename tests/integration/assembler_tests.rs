/*!
 * Audio assembly tests driven by fake external tools
 */

use anyhow::Result;
use std::path::Path;

use readcast::audio::AudioAssembler;
use readcast::audio::assemble::manifest_entry;
use readcast::errors::AssemblyError;

use crate::common::{
    FAKE_FFMPEG, FAKE_FFMPEG_FAILING, FAKE_FFMPEG_MARKER, create_temp_dir, create_test_file,
    write_tool_script,
};

#[tokio::test]
async fn test_assemble_withSingleSegment_shouldCopyWithoutInvokingTool() -> Result<()> {
    let dir = create_temp_dir()?;
    let ffmpeg = write_tool_script(dir.path(), "ffmpeg", FAKE_FFMPEG_MARKER)?;
    let input = create_test_file(dir.path(), "narration.mp3", b"NARRATION-DATA")?;
    let output = dir.path().join("episode.mp3");

    let assembler = AudioAssembler::new(ffmpeg);
    assembler.assemble(&[input], &output).await.unwrap();

    assert_eq!(std::fs::read(&output)?, b"NARRATION-DATA");
    // The concatenation tool was never executed
    assert!(!dir.path().join("ffmpeg_invoked").exists());
    Ok(())
}

#[tokio::test]
async fn test_assemble_withMultipleSegments_shouldConcatenateInOrder() -> Result<()> {
    let dir = create_temp_dir()?;
    let ffmpeg = write_tool_script(dir.path(), "ffmpeg", FAKE_FFMPEG)?;
    let a = create_test_file(dir.path(), "a.mp3", b"AAAA")?;
    let b = create_test_file(dir.path(), "b.mp3", b"BBB")?;
    let c = create_test_file(dir.path(), "c.mp3", b"CC")?;
    let output = dir.path().join("episode.mp3");

    let assembler = AudioAssembler::new(ffmpeg);
    assembler.assemble(&[a, b, c], &output).await.unwrap();

    assert_eq!(std::fs::read(&output)?, b"AAAABBBCC");
    Ok(())
}

#[tokio::test]
async fn test_assemble_withEmptyList_shouldFail() {
    let dir = create_temp_dir().unwrap();
    let assembler = AudioAssembler::new(dir.path().join("ffmpeg"));

    let result = assembler.assemble(&[], &dir.path().join("out.mp3")).await;
    assert!(matches!(result, Err(AssemblyError::NoSegments)));
}

#[tokio::test]
async fn test_assemble_withMissingSegment_shouldFailBeforeInvokingTool() {
    let dir = create_temp_dir().unwrap();
    let assembler = AudioAssembler::new(dir.path().join("ffmpeg"));

    let missing = dir.path().join("ghost.mp3");
    let result = assembler
        .assemble(&[missing.clone()], &dir.path().join("out.mp3"))
        .await;

    match result {
        Err(AssemblyError::MissingSegment(path)) => assert_eq!(path, missing),
        other => panic!("expected MissingSegment, got {:?}", other),
    }
}

#[tokio::test]
async fn test_assemble_withFailingTool_shouldReportLastStderrLine() -> Result<()> {
    let dir = create_temp_dir()?;
    let ffmpeg = write_tool_script(dir.path(), "ffmpeg", FAKE_FFMPEG_FAILING)?;
    let a = create_test_file(dir.path(), "a.mp3", b"AAAA")?;
    let b = create_test_file(dir.path(), "b.mp3", b"BBB")?;
    let output = dir.path().join("episode.mp3");

    let assembler = AudioAssembler::new(ffmpeg);
    let result = assembler.assemble(&[a, b], &output).await;

    match result {
        Err(AssemblyError::ConcatFailed(message)) => {
            assert_eq!(message, "Invalid data found when processing input");
        }
        other => panic!("expected ConcatFailed, got {:?}", other),
    }

    // No partial file is left behind
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_assemble_withMissingTool_shouldReportToolMissing() -> Result<()> {
    let dir = create_temp_dir()?;
    let a = create_test_file(dir.path(), "a.mp3", b"AAAA")?;
    let b = create_test_file(dir.path(), "b.mp3", b"BBB")?;

    let assembler = AudioAssembler::new(dir.path().join("no-such-ffmpeg"));
    let result = assembler.assemble(&[a, b], &dir.path().join("out.mp3")).await;

    assert!(matches!(result, Err(AssemblyError::ToolMissing(_))));
    Ok(())
}

#[test]
fn test_manifest_entry_withQuoteInPath_shouldEscapeIt() {
    assert_eq!(
        manifest_entry(Path::new("/tmp/it's here.mp3")),
        r"file '/tmp/it'\''s here.mp3'"
    );
    assert_eq!(
        manifest_entry(Path::new("/tmp/plain.mp3")),
        "file '/tmp/plain.mp3'"
    );
}
