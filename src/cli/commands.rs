//! Command implementations

use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::adapters::toml_config::PipelineConfig;
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::cli::args::{ProbeArgs, ProcessArgs, ScoreArgs};
use crate::domain::model::Job;
use crate::domain::rules::{EngagementScorer, ScoreBreakdown};
use crate::error::{ReelsError, ReelsResult};
use crate::output::JobReport;
use crate::subtitles;
use crate::utils::path::PathUtils;
use crate::utils::Utils;

/// Validate the upload and run the pipeline
pub async fn process(
    args: &ProcessArgs,
    config: &PipelineConfig,
    container: &dyn AppContainer,
    cancel: &CancellationToken,
) -> ReelsResult<JobReport> {
    config.upload.policy().validate(&args.input)?;

    let source = PathUtils::absolutize(&args.input)?;
    let size = std::fs::metadata(&source)?.len();
    let job_id = args.job_id.clone().unwrap_or_else(Job::generate_id);
    let job = Job::new(
        job_id,
        source,
        &config.work_dir,
        &config.output_dir,
        config.top_count,
    );

    info!(
        "Starting job {}: {} ({})",
        job.id,
        job.source.display(),
        Utils::format_file_size(size)
    );

    let started = Instant::now();
    let result = container.pipeline_interactor().run(&job, cancel).await?;
    info!(
        "Job {} finished in {}",
        job.id,
        Utils::format_duration(started.elapsed())
    );

    Ok(JobReport::from(&result))
}

/// Build the default container for `config`
pub fn default_container(config: &PipelineConfig) -> ReelsResult<DefaultAppContainer> {
    DefaultAppContainer::new(config)
}

/// Result of scoring a single subtitle file
#[derive(Debug, Serialize)]
pub struct ScoreReport {
    pub srt: String,
    pub segment_count: usize,
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
}

/// Score one subtitle file
pub async fn score(args: &ScoreArgs) -> ReelsResult<ScoreReport> {
    let segments = subtitles::read_srt(&args.srt).await?;
    let breakdown = EngagementScorer::score_segments(&segments);
    info!("Scored {}: {}", args.srt.display(), breakdown.total);

    Ok(ScoreReport {
        srt: args.srt.display().to_string(),
        segment_count: segments.len(),
        breakdown,
    })
}

/// Result of probing one file for audio
#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub input: String,
    pub has_audio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Probe one file; a failed probe reports no audio along with the reason
pub async fn probe(
    args: &ProbeArgs,
    container: &dyn AppContainer,
    cancel: &CancellationToken,
) -> ReelsResult<ProbeReport> {
    if !args.input.is_file() {
        return Err(ReelsError::InputValidation(
            crate::domain::errors::InputValidationError::NotFound(args.input.clone()),
        ));
    }

    let report = match container.audio_prober().has_audio(&args.input, cancel).await {
        Ok(presence) => ProbeReport {
            input: args.input.display().to_string(),
            has_audio: presence.is_present(),
            error: None,
        },
        Err(e) => ProbeReport {
            input: args.input.display().to_string(),
            has_audio: false,
            error: Some(e.to_string()),
        },
    };
    Ok(report)
}
