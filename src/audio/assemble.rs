/*!
 * Ordered segment concatenation.
 *
 * A single segment is satisfied by a plain file copy; anything more goes
 * through ffmpeg's concat demuxer with stream copy, so boundaries are
 * sample-accurate and nothing is re-encoded. The concat manifest is a
 * scoped temporary file and is removed on every exit path.
 */

use log::{debug, error};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::errors::AssemblyError;
use crate::file_utils::FileManager;

/// Assembler invoking ffmpeg for multi-segment episodes
#[derive(Debug, Clone)]
pub struct AudioAssembler {
    /// Path or name of the ffmpeg binary
    binary: PathBuf,
}

/// One manifest line for the concat demuxer
///
/// Single quotes inside the path are closed, escaped and reopened, which
/// is the demuxer's own quoting rule.
pub fn manifest_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{}'", escaped)
}

impl AudioAssembler {
    /// Create an assembler around the given binary
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Concatenate ordered segments into one output file
    ///
    /// Fails hard on any tool error: no partial file is left at `output`.
    pub async fn assemble(
        &self,
        segments: &[PathBuf],
        output: &Path,
    ) -> Result<(), AssemblyError> {
        if segments.is_empty() {
            return Err(AssemblyError::NoSegments);
        }

        for segment in segments {
            if !segment.is_file() {
                return Err(AssemblyError::MissingSegment(segment.clone()));
            }
        }

        if let [single] = segments {
            debug!("Single segment, copying {:?} -> {:?}", single, output);
            return FileManager::copy_file(single, output)
                .map_err(|e| AssemblyError::CopyFailed(e.to_string()));
        }

        // Manifest lives next to the output so relative/absolute path
        // handling stays trivial; NamedTempFile removes it on drop
        let manifest = self.write_manifest(segments, output)?;

        debug!(
            "Concatenating {} segments via {:?} -> {:?}",
            segments.len(),
            self.binary,
            output
        );

        let result = Command::new(&self.binary)
            .arg("-hide_banner")
            .arg("-nostdin")
            .arg("-loglevel")
            .arg("error")
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(manifest.path())
            .arg("-c")
            .arg("copy")
            .arg("-y")
            .arg(output)
            .output()
            .await;

        let tool_output = match result {
            Ok(tool_output) => tool_output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AssemblyError::ToolMissing(
                    self.binary.to_string_lossy().to_string(),
                ));
            }
            Err(e) => return Err(AssemblyError::ConcatFailed(e.to_string())),
        };

        if !tool_output.status.success() {
            let last_line = crate::file_utils::last_stderr_line(&tool_output.stderr);
            error!("Concatenation tool failed: {}", last_line);
            // Never publish a partial file
            let _ = std::fs::remove_file(output);
            return Err(AssemblyError::ConcatFailed(last_line));
        }

        Ok(())
    }

    fn write_manifest(
        &self,
        segments: &[PathBuf],
        output: &Path,
    ) -> Result<NamedTempFile, AssemblyError> {
        let dir = output.parent().filter(|p| p.is_dir());
        let mut manifest = match dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(|e| AssemblyError::ConcatFailed(format!("manifest: {}", e)))?;

        for segment in segments {
            let absolute = segment
                .canonicalize()
                .map_err(|e| AssemblyError::ConcatFailed(format!("manifest: {}", e)))?;
            writeln!(manifest, "{}", manifest_entry(&absolute))
                .map_err(|e| AssemblyError::ConcatFailed(format!("manifest: {}", e)))?;
        }
        manifest
            .flush()
            .map_err(|e| AssemblyError::ConcatFailed(format!("manifest: {}", e)))?;

        Ok(manifest)
    }
}
