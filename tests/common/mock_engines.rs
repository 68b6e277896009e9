/*!
 * Mock engine and back-end implementations for testing
 *
 * These avoid every external call in tests: the narration engine writes a
 * fixed-size payload (which the fake ffprobe reads back as milliseconds),
 * and the translation back end transforms text deterministically while
 * counting invocations.
 */

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use readcast::errors::{ProviderError, SynthesisError};
use readcast::providers::TranslationBackend;
use readcast::synthesis::NarrationEngine;

/// Mock narration engine writing `payload_size` zero bytes per call
#[derive(Debug)]
pub struct MockNarrationEngine {
    /// Number of synthesize calls made
    pub calls: Arc<Mutex<usize>>,
    /// Bytes written per narration
    pub payload_size: usize,
    /// Whether the next call should fail
    pub fail: bool,
}

impl MockNarrationEngine {
    pub fn new(payload_size: usize) -> Self {
        Self {
            calls: Arc::new(Mutex::new(0)),
            payload_size,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: Arc::new(Mutex::new(0)),
            payload_size: 0,
            fail: true,
        }
    }

    /// Shared call counter handle
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        self.calls.clone()
    }
}

#[async_trait]
impl NarrationEngine for MockNarrationEngine {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: &str,
        output: &Path,
    ) -> Result<(), SynthesisError> {
        if self.fail {
            return Err(SynthesisError::EngineFailed("mock failure".to_string()));
        }

        *self.calls.lock().unwrap() += 1;
        std::fs::write(output, vec![0u8; self.payload_size])
            .map_err(|e| SynthesisError::EngineFailed(e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Mock translation back end upper-casing its input
#[derive(Debug)]
pub struct MockTranslationBackend {
    /// Texts received, in call order
    pub requests: Arc<Mutex<Vec<String>>>,
    /// Whether every call should fail
    pub fail: bool,
}

impl MockTranslationBackend {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// Shared request log handle
    pub fn request_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl TranslationBackend for MockTranslationBackend {
    async fn translate(
        &self,
        text: &str,
        _source: Option<&str>,
        _target: &str,
    ) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::RequestFailed("mock failure".to_string()));
        }

        self.requests.lock().unwrap().push(text.to_string());
        Ok(text.to_uppercase())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
