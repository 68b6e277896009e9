/*!
 * Narration synthesis.
 *
 * Converts final article text into one narration audio file through one of
 * several interchangeable engines:
 * - `edge_tts`: shells out to the edge-tts tool (Microsoft voices)
 * - `google_tts`: calls the Google Translate TTS endpoint over HTTP
 *
 * The engine is selected once from configuration and held as a trait
 * object; the pipeline never proceeds past narration until the engine has
 * definitively succeeded or failed.
 */

use async_trait::async_trait;
use log::{debug, info};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::app_config::{SynthesisConfig, SynthesisEngine, ToolsConfig};
use crate::errors::SynthesisError;
use crate::file_utils::FileManager;

pub mod edge_tts;
pub mod google_tts;

/// Common trait for all narration engines
///
/// One uniform signature regardless of whether the engine is a blocking
/// subprocess or an awaited HTTP exchange; callers always wait for the
/// result before continuing.
#[async_trait]
pub trait NarrationEngine: Send + Sync + Debug {
    /// Synthesize `text` with the given voice into `output`
    ///
    /// Produces exactly one audio file at `output` or fails. A failure
    /// leaves no usable file behind.
    async fn synthesize(&self, text: &str, voice: &str, output: &Path)
        -> Result<(), SynthesisError>;

    /// Engine display name for logs
    fn name(&self) -> &'static str;
}

/// Build the configured engine
pub fn build_engine(config: &SynthesisConfig, tools: &ToolsConfig) -> Box<dyn NarrationEngine> {
    match config.engine {
        SynthesisEngine::Edge => Box::new(edge_tts::EdgeTts::new(tools.edge_tts.clone())),
        SynthesisEngine::Gtts => Box::new(google_tts::GoogleTts::new(config.timeout_secs)),
    }
}

/// Where a narration request resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationTarget {
    /// A file already satisfies the request; nothing to synthesize
    Existing(PathBuf),

    /// Narration must be produced at this path
    Fresh(PathBuf),
}

impl NarrationTarget {
    /// The resolved output path either way
    pub fn path(&self) -> &Path {
        match self {
            Self::Existing(p) | Self::Fresh(p) => p,
        }
    }
}

/// Narration front end: filename policy plus the selected engine
pub struct NarrationSynthesizer {
    /// Selected engine implementation
    engine: Box<dyn NarrationEngine>,

    /// Directory where final episode files live
    output_dir: PathBuf,

    /// Whether an existing file satisfies a repeat request
    skip_existing: bool,
}

impl NarrationSynthesizer {
    /// Create a synthesizer with the given engine and filename policy
    pub fn new(engine: Box<dyn NarrationEngine>, output_dir: PathBuf, skip_existing: bool) -> Self {
        Self {
            engine,
            output_dir,
            skip_existing,
        }
    }

    /// Resolve the output path for an episode title
    ///
    /// The filename derives deterministically from the sanitized title. An
    /// existing file either satisfies the request (skip-existing) or forces
    /// a timestamp-suffixed sibling so nothing is overwritten.
    pub fn resolve_target(&self, title: &str) -> NarrationTarget {
        let stem = FileManager::sanitize_filename(title);
        let stem = if stem.is_empty() { "untitled".to_string() } else { stem };
        let path = self.output_dir.join(format!("{}.mp3", stem));

        if FileManager::file_exists(&path) {
            if self.skip_existing {
                info!("Already exists (skipping): {:?}", path.file_name().unwrap_or_default());
                return NarrationTarget::Existing(path);
            }
            let variant = FileManager::timestamped_variant(&path);
            debug!("Output exists, using new name: {:?}", variant.file_name().unwrap_or_default());
            return NarrationTarget::Fresh(variant);
        }

        NarrationTarget::Fresh(path)
    }

    /// Synthesize narration into an explicit path
    pub async fn narrate_to(
        &self,
        text: &str,
        voice: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        if let Some(parent) = output.parent() {
            FileManager::ensure_dir(parent)
                .map_err(|e| SynthesisError::EngineFailed(e.to_string()))?;
        }

        debug!("Generating narration ({}) -> {:?}", self.engine.name(), output);
        self.engine.synthesize(text, voice, output).await?;

        if FileManager::file_size(output) == 0 {
            return Err(SynthesisError::EngineFailed(format!(
                "{} produced an empty file",
                self.engine.name()
            )));
        }

        Ok(())
    }

    /// Produce narration for a titled episode, honoring the filename policy
    ///
    /// Returns the resolved path; with skip-existing enabled a repeat call
    /// for the same title returns the same path without re-synthesizing.
    pub async fn narrate(
        &self,
        text: &str,
        voice: &str,
        title: &str,
    ) -> Result<PathBuf, SynthesisError> {
        match self.resolve_target(title) {
            NarrationTarget::Existing(path) => Ok(path),
            NarrationTarget::Fresh(path) => {
                self.narrate_to(text, voice, &path).await?;
                Ok(path)
            }
        }
    }
}
