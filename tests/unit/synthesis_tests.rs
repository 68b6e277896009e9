/*!
 * Tests for narration synthesis: filename policy and idempotence
 */

use anyhow::Result;
use readcast::synthesis::{NarrationSynthesizer, NarrationTarget};

use crate::common::create_temp_dir;
use crate::common::mock_engines::MockNarrationEngine;

#[tokio::test]
async fn test_narrate_withSkipExisting_shouldNotRegenerate() -> Result<()> {
    let dir = create_temp_dir()?;
    let engine = MockNarrationEngine::new(1000);
    let calls = engine.call_counter();
    let synthesizer =
        NarrationSynthesizer::new(Box::new(engine), dir.path().to_path_buf(), true);

    let first = synthesizer.narrate("text", "voice", "My Article").await?;
    let second = synthesizer.narrate("text", "voice", "My Article").await?;

    assert_eq!(first, second);
    assert_eq!(*calls.lock().unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn test_narrate_withoutSkipExisting_shouldProduceDistinctFile() -> Result<()> {
    let dir = create_temp_dir()?;
    let engine = MockNarrationEngine::new(1000);
    let calls = engine.call_counter();
    let synthesizer =
        NarrationSynthesizer::new(Box::new(engine), dir.path().to_path_buf(), false);

    let first = synthesizer.narrate("text", "voice", "My Article").await?;
    let second = synthesizer.narrate("text", "voice", "My Article").await?;

    assert_ne!(first, second);
    assert!(second.file_name().unwrap().to_string_lossy().starts_with("My Article_"));
    assert_eq!(*calls.lock().unwrap(), 2);
    assert!(first.is_file());
    assert!(second.is_file());
    Ok(())
}

#[tokio::test]
async fn test_narrate_withUnsafeTitle_shouldSanitizeFilename() -> Result<()> {
    let dir = create_temp_dir()?;
    let synthesizer = NarrationSynthesizer::new(
        Box::new(MockNarrationEngine::new(100)),
        dir.path().to_path_buf(),
        true,
    );

    let path = synthesizer.narrate("text", "voice", "What? A/B: \"quotes\"").await?;
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "What AB quotes.mp3"
    );
    Ok(())
}

#[tokio::test]
async fn test_narrate_withFailingEngine_shouldReturnError() -> Result<()> {
    let dir = create_temp_dir()?;
    let synthesizer = NarrationSynthesizer::new(
        Box::new(MockNarrationEngine::failing()),
        dir.path().to_path_buf(),
        true,
    );

    let result = synthesizer.narrate("text", "voice", "Broken").await;
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_resolve_target_withEmptyTitle_shouldFallBackToUntitled() {
    let dir = create_temp_dir().unwrap();
    let synthesizer = NarrationSynthesizer::new(
        Box::new(MockNarrationEngine::new(1)),
        dir.path().to_path_buf(),
        true,
    );

    match synthesizer.resolve_target("???") {
        NarrationTarget::Fresh(path) => {
            assert_eq!(path.file_name().unwrap().to_string_lossy(), "untitled.mp3");
        }
        NarrationTarget::Existing(_) => panic!("nothing exists yet"),
    }
}
