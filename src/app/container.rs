use std::sync::Arc;

use tracing::debug;

use crate::adapters::toml_config::PipelineConfig;
use crate::adapters::{FFmpegAdapter, WhisperApiAdapter};
use crate::app::pipeline_interactor::PipelineInteractor;
use crate::engine::AudioProber;
use crate::error::{ReelsError, ReelsResult};
use crate::ports::{MediaToolPort, TranscriptionPort};

pub trait AppContainer: Send + Sync {
    fn pipeline_interactor(&self) -> Arc<PipelineInteractor>;
    fn audio_prober(&self) -> Arc<AudioProber>;
}

pub struct DefaultAppContainer {
    pipeline_interactor: Arc<PipelineInteractor>,
    audio_prober: Arc<AudioProber>,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg and Whisper adapters from `config`
    pub fn new(config: &PipelineConfig) -> ReelsResult<Self> {
        let media_tool = Arc::new(FFmpegAdapter::from_config(config));
        debug!(
            ffmpeg = %media_tool.ffmpeg_path().display(),
            ffprobe = %media_tool.ffprobe_path().display(),
            "Resolved media tools"
        );
        let transcription =
            Arc::new(WhisperApiAdapter::new(&config.transcription).map_err(|e| {
                ReelsError::Config {
                    message: format!("Failed to create transcription client: {}", e),
                }
            })?);

        Ok(Self::with_ports(
            media_tool as Arc<dyn MediaToolPort>,
            transcription as Arc<dyn TranscriptionPort>,
            config,
        ))
    }

    /// Wire arbitrary port implementations
    pub fn with_ports(
        media_tool: Arc<dyn MediaToolPort>,
        transcription: Arc<dyn TranscriptionPort>,
        config: &PipelineConfig,
    ) -> Self {
        let audio_prober = Arc::new(AudioProber::new(Arc::clone(&media_tool)));
        let pipeline_interactor = Arc::new(PipelineInteractor::new(media_tool, transcription, config));

        Self {
            pipeline_interactor,
            audio_prober,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn pipeline_interactor(&self) -> Arc<PipelineInteractor> {
        Arc::clone(&self.pipeline_interactor)
    }

    fn audio_prober(&self) -> Arc<AudioProber> {
        Arc::clone(&self.audio_prober)
    }
}
