/*!
 * End-to-end pipeline scenarios with mocked engines and fake tools
 */

use anyhow::Result;
use id3::TagLike;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use readcast::app_config::{ArticleOptions, Config, ToolsConfig};
use readcast::app_controller::{BatchItem, BatchState, Controller, SourceKind};
use readcast::article::Article;
use readcast::synthesis::NarrationSynthesizer;
use readcast::translation::Translator;

use crate::common::mock_engines::{MockNarrationEngine, MockTranslationBackend};
use crate::common::{
    FAKE_FFMPEG_MARKER, create_temp_dir, fake_tools, markup_with_two_clips, write_tool_script,
};

const GOOD_ID: &str = "abcdefghijk";
const GOOD_ID_2: &str = "AAAAAAAAAAA";
const BAD_ID: &str = "badbadbad12";

/// Narration payload written by the mock engine, in bytes (the fake
/// ffprobe reads sizes back as milliseconds)
const NARRATION_BYTES: usize = 5000;

/// Clip payload written by the fake yt-dlp
const CLIP_BYTES: u64 = 3000;

struct Harness {
    controller: Controller,
    engine_calls: Arc<Mutex<usize>>,
    translation_log: Arc<Mutex<Vec<String>>>,
    output_dir: std::path::PathBuf,
    _dirs: (tempfile::TempDir, tempfile::TempDir),
}

fn harness(tools: ToolsConfig, skip_existing: bool) -> Result<Harness> {
    let tool_dir = create_temp_dir()?;
    let out_dir = create_temp_dir()?;
    let output_dir = out_dir.path().to_path_buf();

    let mut config = Config::default();
    config.output_dir = output_dir.clone();
    config.skip_existing = skip_existing;
    config.tools = tools;

    let engine = MockNarrationEngine::new(NARRATION_BYTES);
    let engine_calls = engine.call_counter();
    let synthesizer =
        NarrationSynthesizer::new(Box::new(engine), output_dir.clone(), skip_existing);

    let backend = MockTranslationBackend::new();
    let translation_log = backend.request_log();
    let translator = Translator::with_backend(Box::new(backend));

    Ok(Harness {
        controller: Controller::with_components(config, translator, synthesizer),
        engine_calls,
        translation_log,
        output_dir,
        _dirs: (tool_dir, out_dir),
    })
}

fn item(title: &str, markup: &str, include_clips: bool) -> BatchItem {
    let article =
        Article::new("1", title, markup).with_language(Some("es".to_string()));
    BatchItem {
        article,
        options: ArticleOptions {
            voice: "es-ES-AlvaroNeural".to_string(),
            language: "es".to_string(),
            include_clips,
            engine: None,
        },
        source: SourceKind::Wallabag,
        title: title.to_string(),
        category: Some("Wallabag".to_string()),
        description: "test episode".to_string(),
    }
}

#[tokio::test]
async fn test_pipeline_scenarioA_noClipsSameLanguage_shouldProduceOneFileWithoutChapters()
-> Result<()> {
    let tool_dir = create_temp_dir()?;
    let mut tools = fake_tools(tool_dir.path())?;
    // A marker ffmpeg proves the concat tool never runs for one segment
    tools.ffmpeg = write_tool_script(tool_dir.path(), "ffmpeg-marker", FAKE_FFMPEG_MARKER)?;
    let h = harness(tools, true)?;

    let markup = "<p>Un artículo sencillo sin vídeos incrustados.</p>";
    let (episode, dropped) = h
        .controller
        .process_article(&item("Scenario A", markup, false))
        .await
        .unwrap();

    assert_eq!(dropped, 0);
    assert!(episode.path.is_file());
    assert_eq!(episode.path.file_name().unwrap().to_string_lossy(), "Scenario A.mp3");
    assert_eq!(std::fs::metadata(&episode.path)?.len(), NARRATION_BYTES as u64);
    assert_eq!(episode.duration_secs, (NARRATION_BYTES / 1000) as u64);
    assert_eq!(episode.category.as_deref(), Some("Wallabag"));

    // No chapters for a narration-only episode, neither in the record nor
    // in the file
    assert!(episode.chapters.is_empty());
    assert!(
        id3::Tag::read_from_path(&episode.path)
            .map(|t| t.frames().count())
            .unwrap_or(0)
            == 0
    );

    // Same language: the translation back end was never called
    assert!(h.translation_log.lock().unwrap().is_empty());
    assert_eq!(*h.engine_calls.lock().unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_scenarioB_twoClips_shouldProduceThreeChapters() -> Result<()> {
    let tool_dir = create_temp_dir()?;
    let h = harness(fake_tools(tool_dir.path())?, true)?;

    let markup = markup_with_two_clips(GOOD_ID, GOOD_ID_2);
    let (episode, dropped) = h
        .controller
        .process_article(&item("Scenario B", &markup, true))
        .await
        .unwrap();

    assert_eq!(dropped, 0);

    let expected_total = NARRATION_BYTES as u64 + 2 * CLIP_BYTES;
    assert_eq!(episode.duration_secs, expected_total / 1000);

    assert_eq!(episode.chapters.len(), 3);
    // Chapter 0 covers exactly the narration
    assert_eq!(episode.chapters[0].start_ms, 0);
    assert_eq!(episode.chapters[0].end_ms, NARRATION_BYTES as u64);
    // Chapters are contiguous and end at the total duration
    assert_eq!(episode.chapters[1].start_ms, episode.chapters[0].end_ms);
    assert_eq!(episode.chapters[2].end_ms, expected_total);

    // The chapter table landed in the file
    let tag = id3::Tag::read_from_path(&episode.path)?;
    let chap_frames = tag.frames().filter(|f| f.id() == "CHAP").count();
    assert_eq!(chap_frames, 3);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_scenarioC_oneFailedClip_shouldDropSegmentAndContinue() -> Result<()> {
    let tool_dir = create_temp_dir()?;
    let h = harness(fake_tools(tool_dir.path())?, true)?;

    let markup = markup_with_two_clips(GOOD_ID, BAD_ID);
    let (episode, dropped) = h
        .controller
        .process_article(&item("Scenario C", &markup, true))
        .await
        .unwrap();

    // The failed download is dropped, not fatal
    assert_eq!(dropped, 1);

    let expected_total = NARRATION_BYTES as u64 + CLIP_BYTES;
    assert_eq!(episode.duration_secs, expected_total / 1000);
    assert_eq!(episode.chapters.len(), 2);
    assert_eq!(episode.chapters[1].end_ms, expected_total);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withSkipExisting_shouldNotRegenerateOnSecondRun() -> Result<()> {
    let tool_dir = create_temp_dir()?;
    let h = harness(fake_tools(tool_dir.path())?, true)?;

    let markup = "<p>Texto repetible.</p>";
    let first = h
        .controller
        .process_article(&item("Repeat Me", markup, false))
        .await
        .unwrap();
    let second = h
        .controller
        .process_article(&item("Repeat Me", markup, false))
        .await
        .unwrap();

    assert_eq!(first.0.path, second.0.path);
    assert_eq!(*h.engine_calls.lock().unwrap(), 1);
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withFailingEngine_shouldFailArticleOnly() -> Result<()> {
    let tool_dir = create_temp_dir()?;
    let out_dir = create_temp_dir()?;

    let mut config = Config::default();
    config.output_dir = out_dir.path().to_path_buf();
    config.tools = fake_tools(tool_dir.path())?;

    let synthesizer = NarrationSynthesizer::new(
        Box::new(MockNarrationEngine::failing()),
        out_dir.path().to_path_buf(),
        true,
    );
    let translator = Translator::with_backend(Box::new(MockTranslationBackend::new()));
    let controller = Controller::with_components(config, translator, synthesizer);

    let result = controller
        .process_article(&item("Doomed", "<p>contenido</p>", false))
        .await;

    assert!(result.is_err());
    // Nothing was published
    assert!(!out_dir.path().join("Doomed.mp3").exists());
    Ok(())
}

#[test]
fn test_batch_state_shouldAllowOnlyOneActiveBatch() {
    let state = Arc::new(BatchState::new());

    let guard = state.try_begin().expect("first begin succeeds");
    assert!(state.is_running());
    assert!(state.try_begin().is_err());

    drop(guard);
    assert!(!state.is_running());
    assert!(state.snapshot().finished);

    let _guard = state.try_begin().expect("begin works again after drop");
}

#[tokio::test]
async fn test_pipeline_shouldDiscardWorkdirOnAssemblyFailure() -> Result<()> {
    let tool_dir = create_temp_dir()?;
    let mut tools = fake_tools(tool_dir.path())?;
    // Multi-segment assembly will fail hard
    tools.ffmpeg = write_tool_script(
        tool_dir.path(),
        "ffmpeg-fail",
        crate::common::FAKE_FFMPEG_FAILING,
    )?;
    let h = harness(tools, true)?;

    let markup = markup_with_two_clips(GOOD_ID, GOOD_ID_2);
    let result = h
        .controller
        .process_article(&item("Broken Assembly", &markup, true))
        .await;

    assert!(result.is_err());
    // No partial episode was published
    assert!(!h.output_dir.join("Broken Assembly.mp3").exists());
    // The narration intermediate did not leak into the output directory
    assert!(!has_mp3_files(&h.output_dir));
    Ok(())
}

fn has_mp3_files(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.flatten().any(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "mp3")
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}
