//! Vertical reel rendering with optional burned-in captions

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::adapters::toml_config::RenderConfig;
use crate::domain::errors::MediaToolError;
use crate::domain::model::{ChunkScore, Reel};
use crate::output::ReelFiles;
use crate::ports::MediaToolPort;

/// Crops chunks to 9:16 and captions them
pub struct Renderer {
    tool: Arc<dyn MediaToolPort>,
    style: RenderConfig,
}

impl Renderer {
    pub fn new(tool: Arc<dyn MediaToolPort>, style: RenderConfig) -> Self {
        Self { tool, style }
    }

    /// Center crop to a 9:16 window of full height, scaled to the canvas
    pub fn crop_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vf".to_string(),
            "crop=ih*9/16:ih".to_string(),
            "-s".to_string(),
            format!("{}x{}", self.style.width, self.style.height),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Burn the subtitle track into `input`
    pub fn caption_args(&self, input: &Path, subtitle: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.to_string_lossy().into_owned(),
            "-vf".to_string(),
            format!(
                "subtitles={}:force_style='Fontsize={},Outline={}'",
                escape_filter_path(subtitle),
                self.style.font_size,
                self.style.outline
            ),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Render the chunk behind `score` as the reel at `rank` (1-based)
    pub async fn render(
        &self,
        score: &ChunkScore,
        rank: usize,
        output_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<Reel, MediaToolError> {
        let files = ReelFiles::new(output_dir, rank);

        self.tool
            .transcode(&self.crop_args(&score.chunk.path, &files.vertical), cancel)
            .await?;

        let captioned = match &score.subtitle_path {
            Some(subtitle) => {
                self.tool
                    .transcode(&self.caption_args(&files.vertical, subtitle, &files.final_cut), cancel)
                    .await?;
                true
            }
            None => {
                debug!(rank, "No subtitle track, using the vertical cut as final");
                tokio::fs::copy(&files.vertical, &files.final_cut)
                    .await
                    .map_err(|source| MediaToolError::Workspace {
                        dir: output_dir.to_path_buf(),
                        source,
                    })?;
                false
            }
        };

        Ok(Reel {
            rank,
            vertical_path: files.vertical,
            final_path: files.final_cut,
            captioned,
            score: score.clone(),
        })
    }
}

/// Escape characters the filter graph parser treats as separators
fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ':' | '\'' | ',' | '[' | ']' | ';') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
