// Domain errors - Failure taxonomy for the reel pipeline

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure of an external media tool invocation (transcoder or inspector)
#[derive(Error, Debug)]
pub enum MediaToolError {
    /// Source file missing or unreadable before the tool ever ran
    #[error("Input is not readable: {path}")]
    Unreadable { path: PathBuf },

    /// Tool could not be started at all
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Tool ran and exited non-zero; stderr is kept for diagnostics only
    #[error("{tool} exited with {}: {}", exit_code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()), stderr.trim())]
    Exit {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Tool exceeded its time budget and was killed
    #[error("{tool} timed out after {after:?}")]
    Timeout { tool: String, after: Duration },

    /// Job cancellation reached the tool and it was killed
    #[error("{tool} was cancelled")]
    Cancelled { tool: String },

    /// Working directory for the tool could not be prepared or listed
    #[error("Cannot use directory {dir}: {source}")]
    Workspace {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Tool succeeded but left none of the expected files behind
    #[error("{tool} produced no output in {dir}")]
    NoOutput { tool: String, dir: PathBuf },
}

impl MediaToolError {
    /// Whether this failure came from job cancellation rather than the tool itself
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MediaToolError::Cancelled { .. })
    }
}

/// Failure talking to the speech-to-text service
#[derive(Error, Debug)]
pub enum TranscriptionServiceError {
    /// No API key configured
    #[error("Transcription API key is not configured (set OPENAI_API_KEY)")]
    MissingApiKey,

    /// Network or transport failure
    #[error("Transcription request failed: {0}")]
    Request(String),

    /// Rejected credentials
    #[error("Transcription service rejected credentials (HTTP {status})")]
    Auth { status: u16 },

    /// Rate limit or quota exhausted
    #[error("Transcription quota exceeded: {body}")]
    Quota { body: String },

    /// Any other non-success status
    #[error("Transcription service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the verbose transcript shape
    #[error("Malformed transcription response: {0}")]
    MalformedResponse(String),

    /// Job cancellation aborted the request
    #[error("Transcription request was cancelled")]
    Cancelled,
}

/// Rejection of an upload before the pipeline runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputValidationError {
    /// Extension outside the accepted container list
    #[error("Invalid file type '{extension}'. Allowed: {allowed}")]
    UnsupportedFormat { extension: String, allowed: String },

    /// Upload larger than the configured ceiling
    #[error("File is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// Nothing at the given path
    #[error("Input file not found: {0}")]
    NotFound(PathBuf),
}

/// Audio inspection failure; the pipeline treats it as "no audio"
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error(transparent)]
    Tool(#[from] MediaToolError),

    #[error("Unparseable probe output: {0}")]
    Malformed(String),
}

/// Per-chunk transcription failure; the pipeline degrades the chunk to score 0
#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("Audio extraction failed: {0}")]
    Extraction(#[from] MediaToolError),

    #[error(transparent)]
    Service(#[from] TranscriptionServiceError),

    #[error("Failed to write subtitle file {path}: {source}")]
    SubtitleWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TranscribeError {
    pub fn is_cancelled(&self) -> bool {
        match self {
            TranscribeError::Extraction(e) => e.is_cancelled(),
            TranscribeError::Service(TranscriptionServiceError::Cancelled) => true,
            _ => false,
        }
    }
}
