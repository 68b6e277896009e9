/*!
 * Narration engine backed by the external edge-tts tool.
 */

use async_trait::async_trait;
use log::debug;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::errors::SynthesisError;
use crate::file_utils::last_stderr_line;

use super::NarrationEngine;

/// Engine that shells out to edge-tts for Microsoft neural voices
#[derive(Debug)]
pub struct EdgeTts {
    /// Path or name of the edge-tts binary
    binary: PathBuf,
}

impl EdgeTts {
    /// Create an engine around the given binary
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl NarrationEngine for EdgeTts {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        debug!("Invoking {:?} with voice {}", self.binary, voice);

        let result = Command::new(&self.binary)
            .arg("--voice")
            .arg(voice)
            .arg("--text")
            .arg(text)
            .arg("--write-media")
            .arg(output)
            .output()
            .await;

        let output_data = match result {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SynthesisError::ToolMissing(
                    self.binary.to_string_lossy().to_string(),
                ));
            }
            Err(e) => return Err(SynthesisError::EngineFailed(e.to_string())),
        };

        if !output_data.status.success() {
            // A failed run may leave a zero-byte file behind
            let _ = std::fs::remove_file(output);
            return Err(SynthesisError::EngineFailed(last_stderr_line(
                &output_data.stderr,
            )));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "edge-tts"
    }
}
