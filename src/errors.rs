/*!
 * Error types for the readcast application.
 *
 * This module contains custom error types for different parts of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 * The variants mirror the recovery policy: source, translation and clip
 * errors are recoverable per article or per clip, synthesis and assembly
 * errors are fatal to one article, feed errors are fatal to the feed step.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to an article source service
#[derive(Error, Debug)]
pub enum SourceError {
    /// Error when authenticating against the service
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The service answered with an unexpected body
    #[error("Unexpected response from {service}: {body}")]
    UnexpectedResponse {
        /// Service name
        service: String,
        /// First line of the offending body
        body: String,
    },
}

/// Errors that can occur when calling a translation back end
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors that can occur while producing narration audio
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The configured engine binary could not be spawned
    #[error("Synthesis tool not available: {0}")]
    ToolMissing(String),

    /// The engine ran but did not produce usable audio
    #[error("Synthesis failed: {0}")]
    EngineFailed(String),

    /// Error from the HTTP-backed engine
    #[error("Synthesis request failed: {0}")]
    RequestFailed(String),
}

/// Errors that can occur while resolving or downloading external clips
#[derive(Error, Debug)]
pub enum ClipError {
    /// The downloader binary could not be spawned
    #[error("Clip downloader not available: {0}")]
    ToolMissing(String),

    /// The downloader exited with a failure
    #[error("Clip download failed for {url}: {message}")]
    DownloadFailed {
        /// Canonical clip URL
        url: String,
        /// Final error line from the tool
        message: String,
    },

    /// The downloader succeeded but the expected file is absent
    #[error("Downloader produced no output for {0}")]
    MissingOutput(String),
}

/// Errors that can occur while assembling audio segments
#[derive(Error, Debug)]
pub enum AssemblyError {
    /// An input segment path does not exist
    #[error("Segment file does not exist: {0}")]
    MissingSegment(PathBuf),

    /// The segment list was empty
    #[error("Cannot assemble an empty segment list")]
    NoSegments,

    /// The single-segment copy path failed
    #[error("Failed to copy segment into place: {0}")]
    CopyFailed(String),

    /// The concatenation tool exited with a failure
    #[error("Concatenation failed: {0}")]
    ConcatFailed(String),

    /// The concatenation tool binary could not be spawned
    #[error("Concatenation tool not available: {0}")]
    ToolMissing(String),
}

/// Errors that can occur while building or writing the podcast feed
#[derive(Error, Debug)]
pub enum FeedError {
    /// Error scanning the output directory
    #[error("Failed to scan output directory: {0}")]
    ScanFailed(String),

    /// Error serializing the feed document
    #[error("Failed to serialize feed: {0}")]
    SerializeFailed(String),

    /// Error writing the feed document
    #[error("Failed to write feed: {0}")]
    WriteFailed(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from an article source
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Error from a translation back end
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from narration synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Error from clip handling
    #[error("Clip error: {0}")]
    Clip(#[from] ClipError),

    /// Error from audio assembly
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Error from feed generation
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
