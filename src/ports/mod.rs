// Ports - Interface definitions (contracts) for the external tools the pipeline drives

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Captured output of a finished media tool run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// Captured standard output (lossy UTF-8)
    pub stdout: String,
    /// Captured standard error (lossy UTF-8), kept for diagnostics only
    pub stderr: String,
}

/// Port for the command-line transcoder and its inspection companion.
///
/// A non-zero exit is the only failure signal; stderr is never parsed.
/// Implementations must kill the child process when `cancel` fires or the
/// configured timeout elapses.
#[async_trait]
pub trait MediaToolPort: Send + Sync {
    /// Run the transcoder (ffmpeg) in overwrite mode with the given arguments
    async fn transcode(
        &self,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, MediaToolError>;

    /// Run the inspector (ffprobe) and return its output for the caller to parse
    async fn inspect(
        &self,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, MediaToolError>;
}

/// Port for the speech-to-text service
#[async_trait]
pub trait TranscriptionPort: Send + Sync {
    /// Transcribe a mono 16 kHz audio file into ordered, timestamped segments
    async fn transcribe(
        &self,
        audio_path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<TranscriptSegment>, TranscriptionServiceError>;
}
