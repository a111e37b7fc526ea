//! Reel file naming and the JSON job report

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::model::{ChunkScore, JobResult};
use crate::error::ReelsError;

/// Output paths for one reel
#[derive(Debug, Clone, PartialEq)]
pub struct ReelFiles {
    /// Cropped intermediate, `reel_NN_vertical.mp4`
    pub vertical: PathBuf,
    /// Deliverable, `reel_NN_final.mp4`
    pub final_cut: PathBuf,
}

impl ReelFiles {
    /// Paths for the reel at `rank` (1-based) inside `output_dir`
    pub fn new(output_dir: &Path, rank: usize) -> Self {
        Self {
            vertical: output_dir.join(format!("{}_vertical.mp4", reel_base_name(rank))),
            final_cut: output_dir.join(format!("{}_final.mp4", reel_base_name(rank))),
        }
    }
}

/// `reel_NN`, NN zero-padded to two digits
pub fn reel_base_name(rank: usize) -> String {
    format!("reel_{:02}", rank)
}

/// Score summary attached to each reel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReelScore {
    pub score: u32,
    pub words: usize,
}

/// Per-chunk line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkReport {
    pub index: u32,
    pub chunk: PathBuf,
    pub score: u32,
    pub words: usize,
    pub duration: f64,
    pub captioned: bool,
}

impl From<&ChunkScore> for ChunkReport {
    fn from(score: &ChunkScore) -> Self {
        Self {
            index: score.chunk.index,
            chunk: score.chunk.path.clone(),
            score: score.score,
            words: score.word_count,
            duration: score.duration,
            captioned: score.subtitle_path.is_some(),
        }
    }
}

/// Report printed for a finished job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobReport {
    pub success: bool,
    pub job_id: String,
    /// Final reel paths in rank order
    pub reels: Vec<PathBuf>,
    /// Score of each reel, aligned with `reels`
    pub scores: Vec<ReelScore>,
    /// Every chunk in source order
    pub chunks: Vec<ChunkReport>,
}

impl From<&JobResult> for JobReport {
    fn from(result: &JobResult) -> Self {
        Self {
            success: true,
            job_id: result.job_id.clone(),
            reels: result.reels.iter().map(|r| r.final_path.clone()).collect(),
            scores: result
                .reels
                .iter()
                .map(|r| ReelScore {
                    score: r.score.score,
                    words: r.score.word_count,
                })
                .collect(),
            chunks: result.chunk_scores.iter().map(ChunkReport::from).collect(),
        }
    }
}

/// Report printed when a job cannot finish
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub code: String,
    pub error: String,
}

impl ErrorReport {
    pub fn new(job_id: Option<String>, error: &ReelsError) -> Self {
        Self {
            success: false,
            job_id,
            code: error.code().to_string(),
            error: error.to_string(),
        }
    }
}
