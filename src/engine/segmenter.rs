//! Splitting the source video into fixed-length chunks

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::errors::MediaToolError;
use crate::domain::model::Chunk;
use crate::ports::MediaToolPort;
use crate::utils::path::PathUtils;

/// Stream-copy segmenter
pub struct Segmenter {
    tool: Arc<dyn MediaToolPort>,
    chunk_seconds: u32,
}

impl Segmenter {
    pub fn new(tool: Arc<dyn MediaToolPort>, chunk_seconds: u32) -> Self {
        Self { tool, chunk_seconds }
    }

    /// Transcoder arguments for splitting `source` into `output_dir`
    pub fn split_args(&self, source: &Path, output_dir: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-map".to_string(),
            "0".to_string(),
            "-segment_time".to_string(),
            self.chunk_seconds.to_string(),
            "-f".to_string(),
            "segment".to_string(),
            "-reset_timestamps".to_string(),
            "1".to_string(),
            output_dir
                .join(Chunk::file_pattern())
                .to_string_lossy()
                .into_owned(),
        ]
    }

    /// Split `source` into `output_dir` and return the chunks in index order
    pub async fn split(
        &self,
        source: &Path,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<Chunk>, MediaToolError> {
        if !source.is_file() {
            return Err(MediaToolError::Unreadable {
                path: source.to_path_buf(),
            });
        }

        PathUtils::ensure_dir(output_dir)
            .await
            .map_err(|source| MediaToolError::Workspace {
                dir: output_dir.to_path_buf(),
                source,
            })?;

        self.tool
            .transcode(&self.split_args(source, output_dir), cancel)
            .await?;

        let chunks = PathUtils::list_chunks(output_dir, self.chunk_seconds).map_err(|source| {
            MediaToolError::Workspace {
                dir: output_dir.to_path_buf(),
                source,
            }
        })?;

        if chunks.is_empty() {
            return Err(MediaToolError::NoOutput {
                tool: "ffmpeg".to_string(),
                dir: output_dir.to_path_buf(),
            });
        }

        debug!(dir = %output_dir.display(), "Ingested chunk directory");
        info!("Split {} into {} chunks", source.display(), chunks.len());
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ToolOutput;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Writes `count` chunk files into the directory named by the last argument
    struct FakeSplitter {
        count: u32,
        calls: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl MediaToolPort for FakeSplitter {
        async fn transcode(
            &self,
            args: &[String],
            _cancel: &CancellationToken,
        ) -> Result<ToolOutput, MediaToolError> {
            self.calls.lock().unwrap().push(args.to_vec());
            let pattern = Path::new(args.last().unwrap());
            let dir = pattern.parent().unwrap();
            for i in (0..self.count).rev() {
                std::fs::write(dir.join(Chunk::file_name(i)), b"chunk").unwrap();
            }
            Ok(ToolOutput::default())
        }

        async fn inspect(
            &self,
            _args: &[String],
            _cancel: &CancellationToken,
        ) -> Result<ToolOutput, MediaToolError> {
            unreachable!("segmenter never inspects")
        }
    }

    fn fake(count: u32) -> Arc<FakeSplitter> {
        Arc::new(FakeSplitter {
            count,
            calls: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_split_args() {
        let segmenter = Segmenter::new(fake(0), 20);
        let args = segmenter.split_args(Path::new("in.mp4"), Path::new("work/chunks"));
        assert_eq!(
            args,
            vec![
                "-i",
                "in.mp4",
                "-map",
                "0",
                "-segment_time",
                "20",
                "-f",
                "segment",
                "-reset_timestamps",
                "1",
                Path::new("work/chunks").join("chunk_%03d.mp4").to_str().unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_split_returns_sorted_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.mp4");
        std::fs::write(&source, b"video").unwrap();
        let chunks_dir = dir.path().join("job").join("chunks");

        let tool = fake(4);
        let segmenter = Segmenter::new(tool.clone(), 20);
        let chunks = segmenter
            .split(&source, &chunks_dir, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().enumerate().all(|(i, c)| c.index == i as u32));
        assert_eq!(chunks[1].path, chunks_dir.join("chunk_001.mp4"));
        assert_eq!(tool.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_source_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let tool = fake(4);
        let segmenter = Segmenter::new(tool.clone(), 20);
        let err = segmenter
            .split(&dir.path().join("missing.mp4"), dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MediaToolError::Unreadable { .. }));
        assert!(tool.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zero_chunks_is_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.mp4");
        std::fs::write(&source, b"video").unwrap();

        let segmenter = Segmenter::new(fake(0), 20);
        let err = segmenter
            .split(&source, &dir.path().join("chunks"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaToolError::NoOutput { .. }));
    }
}
