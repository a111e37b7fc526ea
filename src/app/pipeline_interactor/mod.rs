// Pipeline interactor - Orchestrates one reel job from source video to rendered reels

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::adapters::toml_config::PipelineConfig;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{AudioProber, ChunkTranscriber, PipelineStep, Renderer, Segmenter};
use crate::error::{ReelsError, ReelsResult};
use crate::ports::*;
use crate::subtitles;
use crate::utils::path::PathUtils;

/// Limits and policy applied to every job
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub max_parallel_chunks: usize,
    pub max_parallel_renders: usize,
    /// Score floor applied before selection, off by default
    pub min_score: Option<u32>,
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_parallel_chunks: config.max_parallel_chunks.max(1),
            max_parallel_renders: config.max_parallel_renders.max(1),
            min_score: config.min_score,
        }
    }
}

/// Interactor for the reel pipeline use case
pub struct PipelineInteractor {
    segmenter: Segmenter,
    prober: Arc<AudioProber>,
    transcriber: Arc<ChunkTranscriber>,
    renderer: Arc<Renderer>,
    settings: PipelineSettings,
}

impl PipelineInteractor {
    /// Create new pipeline interactor with injected ports
    pub fn new(
        media_tool: Arc<dyn MediaToolPort>,
        transcription: Arc<dyn TranscriptionPort>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            segmenter: Segmenter::new(Arc::clone(&media_tool), config.chunk_seconds),
            prober: Arc::new(AudioProber::new(Arc::clone(&media_tool))),
            transcriber: Arc::new(ChunkTranscriber::new(Arc::clone(&media_tool), transcription)),
            renderer: Arc::new(Renderer::new(media_tool, config.render.clone())),
            settings: PipelineSettings::from(config),
        }
    }

    /// Run a job to completion
    pub async fn run(&self, job: &Job, cancel: &CancellationToken) -> ReelsResult<JobResult> {
        let (state, _rx) = watch::channel(JobState::Created);
        self.run_with_state(job, cancel, &state).await
    }

    /// Run a job, publishing every state change on `state`.
    ///
    /// Dropping the returned future cancels the job: chunk and render tasks
    /// are aborted and in-flight tool invocations are killed.
    pub async fn run_with_state(
        &self,
        job: &Job,
        cancel: &CancellationToken,
        state: &watch::Sender<JobState>,
    ) -> ReelsResult<JobResult> {
        let cancel = cancel.child_token();
        let _cancel_on_drop = cancel.clone().drop_guard();
        let cancel = &cancel;
        let mut tracker = StateTracker::new(&job.id, state);

        tracker.advance(JobState::Segmenting);
        for dir in [&job.chunks_dir, &job.output_dir] {
            if PathUtils::has_entries(dir).await? {
                error!(job_id = %job.id, dir = %dir.display(), "Job directory already holds files");
                tracker.advance(JobState::Failed);
                return Err(ReelsError::WorkspaceInUse {
                    job_id: job.id.clone(),
                    dir: dir.clone(),
                });
            }
        }

        tokio::fs::create_dir_all(&job.chunks_dir).await?;
        tokio::fs::create_dir_all(&job.output_dir).await?;
        info!(job_id = %job.id, chunks_dir = %job.chunks_dir.display(), output_dir = %job.output_dir.display(), "Job directories ready");

        info!("{} Splitting video into chunks...", PipelineStep::Split.prefix());
        let chunks = match self.segmenter.split(&job.source, &job.chunks_dir, cancel).await {
            Ok(chunks) => chunks,
            Err(e) if e.is_cancelled() || cancel.is_cancelled() => return Err(tracker.cancel()),
            Err(e) => {
                error!(job_id = %job.id, error = %e, "Segmentation failed");
                tracker.advance(JobState::Failed);
                return Err(ReelsError::Segmentation(e));
            }
        };
        tracker.check(cancel)?;

        tracker.advance(JobState::ScoringChunks);
        info!("{} Processing {} chunks...", PipelineStep::Score.prefix(), chunks.len());
        let chunk_scores = self.score_chunks(chunks, cancel).await;
        tracker.check(cancel)?;

        tracker.advance(JobState::Selecting);
        info!("{} Selecting top {} chunks...", PipelineStep::Select.prefix(), job.top_count);
        let selected = self.select(&chunk_scores, job.top_count);
        for s in &selected {
            info!("  * {} (score: {})", s.chunk.path.display(), s.score);
        }

        tracker.advance(JobState::Rendering);
        info!("{} Generating final reels...", PipelineStep::Render.prefix());
        let reels = self.render_reels(selected, job, cancel).await;
        tracker.check(cancel)?;

        tracker.advance(JobState::Completed);
        info!(job_id = %job.id, "Done! Created {} reels.", reels.len());

        Ok(JobResult {
            job_id: job.id.clone(),
            reels,
            chunk_scores,
        })
    }

    fn select(&self, scores: &[ChunkScore], top_count: usize) -> Vec<ChunkScore> {
        match self.settings.min_score {
            Some(floor) => {
                let eligible = ChunkSelector::filter_by_min_score(scores, floor);
                debug!(floor, eligible = eligible.len(), "Applied minimum score");
                ChunkSelector::pick_top(&eligible, top_count)
            }
            None => ChunkSelector::pick_top(scores, top_count),
        }
    }

    /// Probe, transcribe and score every chunk on the bounded pool; results in chunk order
    async fn score_chunks(&self, chunks: Vec<Chunk>, cancel: &CancellationToken) -> Vec<ChunkScore> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_parallel_chunks));
        let mut tasks = JoinSet::new();
        let mut pending = BTreeMap::new();

        for chunk in chunks {
            let semaphore = Arc::clone(&semaphore);
            let prober = Arc::clone(&self.prober);
            let transcriber = Arc::clone(&self.transcriber);
            let cancel = cancel.clone();
            let task_chunk = chunk.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return ChunkScore::silent(task_chunk);
                };
                if cancel.is_cancelled() {
                    return ChunkScore::silent(task_chunk);
                }
                score_chunk(&prober, &transcriber, task_chunk, &cancel).await
            });
            pending.insert(chunk.index, chunk);
        }

        let mut scores = Vec::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(score) => {
                    pending.remove(&score.chunk.index);
                    scores.push(score);
                }
                Err(e) => warn!(error = %e, "Chunk task failed"),
            }
        }
        for chunk in pending.into_values() {
            warn!(chunk = chunk.index, path = %chunk.path.display(), "Chunk produced no score, treating as silent");
            scores.push(ChunkScore::silent(chunk));
        }

        scores.sort_by_key(|s| s.chunk.index);
        scores
    }

    /// Render the selection on the bounded pool; failed reels are dropped
    async fn render_reels(
        &self,
        selected: Vec<ChunkScore>,
        job: &Job,
        cancel: &CancellationToken,
    ) -> Vec<Reel> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_parallel_renders));
        let mut tasks = JoinSet::new();

        for (i, score) in selected.into_iter().enumerate() {
            let rank = i + 1;
            let semaphore = Arc::clone(&semaphore);
            let renderer = Arc::clone(&self.renderer);
            let output_dir = job.output_dir.clone();
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                info!("  -> Rendering reel {} from {}", rank, score.chunk.path.display());
                match renderer.render(&score, rank, &output_dir, &cancel).await {
                    Ok(reel) => {
                        info!("  Created: {}", reel.final_path.display());
                        Some(reel)
                    }
                    Err(e) => {
                        warn!(rank, chunk = score.chunk.index, path = %score.chunk.path.display(), error = %e, "Render failed, dropping reel");
                        None
                    }
                }
            });
        }

        let mut reels = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(reel)) => reels.push(reel),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Render task failed"),
            }
        }

        reels.sort_by_key(|r| r.rank);
        reels
    }
}

/// Probe, transcribe and score one chunk; every failure degrades to a silent score
async fn score_chunk(
    prober: &AudioProber,
    transcriber: &ChunkTranscriber,
    chunk: Chunk,
    cancel: &CancellationToken,
) -> ChunkScore {
    let presence = match prober.has_audio(&chunk.path, cancel).await {
        Ok(presence) => presence,
        Err(e) => {
            warn!(chunk = chunk.index, path = %chunk.path.display(), error = %e, "Audio probe failed, treating chunk as silent");
            AudioPresence::Absent
        }
    };

    if !presence.is_present() {
        info!("  No audio in: {} (skipping transcription)", chunk.path.display());
        return ChunkScore::silent(chunk);
    }

    info!("  -> Transcribing: {}", chunk.path.display());
    let subtitle_path = match transcriber.transcribe(&chunk, cancel).await {
        Ok(Transcription::Captioned { subtitle_path, .. }) => subtitle_path,
        Ok(Transcription::Silent) => return ChunkScore::silent(chunk),
        Err(e) => {
            warn!(chunk = chunk.index, path = %chunk.path.display(), error = %e, "Audio extraction/transcription failed, skipping");
            return ChunkScore::silent(chunk);
        }
    };

    match subtitles::read_srt(&subtitle_path).await {
        Ok(segments) => {
            let score = EngagementScorer::score_parsed(&chunk, &subtitle_path, &segments);
            info!("  Score: {} ({} words) for {}", score.score, score.word_count, chunk.path.display());
            score
        }
        Err(e) => {
            warn!(chunk = chunk.index, subtitle = %subtitle_path.display(), error = %e, "Subtitle unreadable, scoring as silent");
            ChunkScore::silent(chunk)
        }
    }
}

/// Job lifecycle bookkeeping
struct StateTracker<'a> {
    job_id: &'a str,
    state: &'a watch::Sender<JobState>,
}

impl<'a> StateTracker<'a> {
    fn new(job_id: &'a str, state: &'a watch::Sender<JobState>) -> Self {
        state.send_replace(JobState::Created);
        Self { job_id, state }
    }

    fn advance(&mut self, next: JobState) {
        let current = *self.state.borrow();
        debug_assert!(
            current.can_transition_to(next),
            "invalid job transition {current} -> {next}"
        );
        debug!(job_id = %self.job_id, from = %current, to = %next, "Job state changed");
        self.state.send_replace(next);
    }

    /// Move to `Cancelled` and build the matching error
    fn cancel(&mut self) -> ReelsError {
        warn!(job_id = %self.job_id, "Job cancelled");
        self.advance(JobState::Cancelled);
        ReelsError::Cancelled {
            job_id: self.job_id.to_string(),
        }
    }

    fn check(&mut self, cancel: &CancellationToken) -> ReelsResult<()> {
        if cancel.is_cancelled() {
            Err(self.cancel())
        } else {
            Ok(())
        }
    }
}
