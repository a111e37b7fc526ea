//! FFmpeg execution adapter
//!
//! Drives the `ffmpeg` and `ffprobe` command-line tools as child processes.
//! Every invocation races the child against the job's cancellation token and
//! an optional timeout; whichever loses is dropped, and `kill_on_drop` makes
//! sure the child process goes with it.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::adapters::toml_config::PipelineConfig;
use crate::domain::errors::MediaToolError;
use crate::ports::{MediaToolPort, ToolOutput};

/// FFmpeg-based media tool adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    timeout: Option<Duration>,
}

impl FFmpegAdapter {
    /// Create an adapter around explicit binaries
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout: None,
        }
    }

    /// Resolve binaries from config, falling back to a `PATH` lookup
    pub fn from_config(config: &PipelineConfig) -> Self {
        let ffmpeg = resolve_tool("ffmpeg", config.ffmpeg_path.as_deref());
        let ffprobe = resolve_tool("ffprobe", config.ffprobe_path.as_deref());
        Self::new(ffmpeg, ffprobe).with_timeout(config.tool_timeout_secs.map(Duration::from_secs))
    }

    /// Kill any invocation that runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }

    async fn run(
        &self,
        program: &Path,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, MediaToolError> {
        let tool = tool_name(program);
        if cancel.is_cancelled() {
            return Err(MediaToolError::Cancelled { tool });
        }

        debug!(tool = %tool, args = ?args, "Invoking media tool");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| MediaToolError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(after) => tokio::time::sleep(after).await,
                None => std::future::pending::<()>().await,
            }
        };

        let output = tokio::select! {
            result = child.wait_with_output() => result.map_err(|source| MediaToolError::Spawn {
                tool: tool.clone(),
                source,
            })?,
            _ = cancel.cancelled() => {
                debug!(tool = %tool, "Cancellation requested, killing media tool");
                return Err(MediaToolError::Cancelled { tool });
            }
            _ = deadline => {
                return Err(MediaToolError::Timeout {
                    tool,
                    after: timeout.unwrap_or_default(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!(tool = %tool, stderr = %stderr, "Media tool finished");

        if !output.status.success() {
            return Err(MediaToolError::Exit {
                tool,
                exit_code: output.status.code(),
                stderr,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}

#[async_trait]
impl MediaToolPort for FFmpegAdapter {
    async fn transcode(
        &self,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, MediaToolError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("-y".to_string());
        full.extend_from_slice(args);
        self.run(&self.ffmpeg, &full, cancel).await
    }

    async fn inspect(
        &self,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, MediaToolError> {
        self.run(&self.ffprobe, args, cancel).await
    }
}

fn resolve_tool(name: &str, configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(path) if path.exists() => path.to_path_buf(),
        _ => which::which(name).unwrap_or_else(|_| PathBuf::from(name)),
    }
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string_lossy().into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_transcode_prepends_overwrite_flag() {
        let adapter = FFmpegAdapter::new("echo", "echo");
        let output = adapter
            .transcode(&args(&["-i", "in.mp4"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "-y -i in.mp4");
    }

    #[tokio::test]
    async fn test_inspect_passes_args_through() {
        let adapter = FFmpegAdapter::new("echo", "echo");
        let output = adapter
            .inspect(&args(&["-of", "json"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "-of json");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_error() {
        let adapter = FFmpegAdapter::new("false", "false");
        let err = adapter
            .inspect(&[], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaToolError::Exit { exit_code: Some(1), .. }));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let adapter = FFmpegAdapter::new("nonexistent_tool_xyz_12345", "nonexistent_tool_xyz_12345");
        let err = adapter
            .inspect(&[], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaToolError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let adapter = FFmpegAdapter::new("sleep", "sleep").with_timeout(Some(Duration::from_millis(100)));
        let started = Instant::now();
        let err = adapter
            .inspect(&args(&["10"]), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, MediaToolError::Timeout { .. }), "unexpected: {err}");
        assert!(err.to_string().contains("timed out"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_cancellation_kills_process() {
        let adapter = FFmpegAdapter::new("sleep", "sleep");
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let err = adapter.inspect(&args(&["10"]), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_cancelled_never_spawns() {
        let adapter = FFmpegAdapter::new("nonexistent_tool_xyz_12345", "nonexistent_tool_xyz_12345");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = adapter.inspect(&[], &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_configured_path_must_exist() {
        let resolved = resolve_tool("ffmpeg", Some(Path::new("/definitely/not/here/ffmpeg")));
        assert_ne!(resolved, PathBuf::from("/definitely/not/here/ffmpeg"));
    }
}
