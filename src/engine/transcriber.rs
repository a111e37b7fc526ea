//! Chunk transcription: audio extraction, speech-to-text and subtitle output

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::domain::errors::TranscribeError;
use crate::domain::model::{Chunk, Transcription};
use crate::ports::{MediaToolPort, TranscriptionPort};
use crate::subtitles;

/// Sample rate expected by the speech-to-text service
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;

/// Turns a chunk into a subtitle track next to it
pub struct ChunkTranscriber {
    tool: Arc<dyn MediaToolPort>,
    service: Arc<dyn TranscriptionPort>,
}

impl ChunkTranscriber {
    pub fn new(tool: Arc<dyn MediaToolPort>, service: Arc<dyn TranscriptionPort>) -> Self {
        Self { tool, service }
    }

    /// Transcoder arguments extracting mono 16 kHz audio from `chunk`
    pub fn extract_args(chunk: &Chunk) -> Vec<String> {
        vec![
            "-i".to_string(),
            chunk.path.to_string_lossy().into_owned(),
            "-vn".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            TRANSCRIPTION_SAMPLE_RATE.to_string(),
            chunk.audio_path().to_string_lossy().into_owned(),
        ]
    }

    /// Extract, transcribe and write `chunk_NNN.srt`.
    ///
    /// Returns [`Transcription::Silent`] without writing a file when the
    /// service heard nothing.
    pub async fn transcribe(
        &self,
        chunk: &Chunk,
        cancel: &CancellationToken,
    ) -> Result<Transcription, TranscribeError> {
        self.tool.transcode(&Self::extract_args(chunk), cancel).await?;

        let segments = self.service.transcribe(&chunk.audio_path(), cancel).await?;
        if segments.is_empty() {
            debug!(chunk = chunk.index, "Transcription returned no segments");
            return Ok(Transcription::Silent);
        }

        let subtitle_path = chunk.subtitle_path();
        subtitles::write_srt(&subtitle_path, &segments)
            .await
            .map_err(|source| TranscribeError::SubtitleWrite {
                path: subtitle_path.clone(),
                source,
            })?;

        debug!(
            chunk = chunk.index,
            segments = segments.len(),
            subtitle = %subtitle_path.display(),
            "Wrote subtitle track"
        );
        Ok(Transcription::Captioned {
            subtitle_path,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{MediaToolError, TranscriptionServiceError};
    use crate::domain::model::TranscriptSegment;
    use crate::ports::ToolOutput;
    use async_trait::async_trait;
    use std::path::Path;

    /// Writes the output file named by the last argument
    struct TouchTool;

    #[async_trait]
    impl MediaToolPort for TouchTool {
        async fn transcode(
            &self,
            args: &[String],
            _cancel: &CancellationToken,
        ) -> Result<ToolOutput, MediaToolError> {
            std::fs::write(args.last().unwrap(), b"RIFF").unwrap();
            Ok(ToolOutput::default())
        }

        async fn inspect(
            &self,
            _args: &[String],
            _cancel: &CancellationToken,
        ) -> Result<ToolOutput, MediaToolError> {
            unreachable!()
        }
    }

    struct FixedService(Vec<TranscriptSegment>);

    #[async_trait]
    impl TranscriptionPort for FixedService {
        async fn transcribe(
            &self,
            audio_path: &Path,
            _cancel: &CancellationToken,
        ) -> Result<Vec<TranscriptSegment>, TranscriptionServiceError> {
            assert!(audio_path.exists(), "audio must be extracted first");
            Ok(self.0.clone())
        }
    }

    struct FailingService;

    #[async_trait]
    impl TranscriptionPort for FailingService {
        async fn transcribe(
            &self,
            _audio_path: &Path,
            _cancel: &CancellationToken,
        ) -> Result<Vec<TranscriptSegment>, TranscriptionServiceError> {
            Err(TranscriptionServiceError::Quota {
                body: "rate limited".to_string(),
            })
        }
    }

    fn chunk_in(dir: &Path) -> Chunk {
        let path = dir.join(Chunk::file_name(2));
        std::fs::write(&path, b"video").unwrap();
        Chunk::new(2, path, 20)
    }

    #[test]
    fn test_extract_args() {
        let chunk = Chunk::new(0, "/w/chunks/chunk_000.mp4", 20);
        assert_eq!(
            ChunkTranscriber::extract_args(&chunk),
            vec!["-i", "/w/chunks/chunk_000.mp4", "-vn", "-ac", "1", "-ar", "16000", "/w/chunks/chunk_000.wav"]
        );
    }

    #[tokio::test]
    async fn test_captioned_writes_srt() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = chunk_in(dir.path());
        let segments = vec![TranscriptSegment::new(0.0, 2.0, "hello world")];
        let transcriber = ChunkTranscriber::new(Arc::new(TouchTool), Arc::new(FixedService(segments.clone())));

        let result = transcriber.transcribe(&chunk, &CancellationToken::new()).await.unwrap();

        assert_eq!(result.subtitle_path(), Some(dir.path().join("chunk_002.srt").as_path()));
        assert_eq!(subtitles::read_srt(&chunk.subtitle_path()).await.unwrap(), segments);
    }

    #[tokio::test]
    async fn test_no_segments_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = chunk_in(dir.path());
        let transcriber = ChunkTranscriber::new(Arc::new(TouchTool), Arc::new(FixedService(vec![])));

        let result = transcriber.transcribe(&chunk, &CancellationToken::new()).await.unwrap();

        assert_eq!(result, Transcription::Silent);
        assert!(!chunk.subtitle_path().exists());
    }

    #[tokio::test]
    async fn test_service_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let chunk = chunk_in(dir.path());
        let transcriber = ChunkTranscriber::new(Arc::new(TouchTool), Arc::new(FailingService));

        let err = transcriber.transcribe(&chunk, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, TranscribeError::Service(TranscriptionServiceError::Quota { .. })));
        assert!(!err.is_cancelled());
    }
}
