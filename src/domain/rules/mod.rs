// Domain rules - Scoring, selection and upload policies

use std::path::Path;

use serde::Serialize;

use crate::domain::errors::InputValidationError;
use crate::domain::model::*;
use crate::utils::path::PathUtils;


/// Speaking rate (words per second) that earns the full density score
pub const IDEAL_WORDS_PER_SECOND: f64 = 2.5;
/// Word count that earns the full volume score
pub const FULL_WORD_COUNT: f64 = 50.0;
/// Utterance count that earns the full segment score
pub const FULL_SEGMENT_COUNT: f64 = 10.0;

const DENSITY_WEIGHT: f64 = 40.0;
const VOLUME_WEIGHT: f64 = 30.0;
const COVERAGE_WEIGHT: f64 = 20.0;
const SEGMENT_WEIGHT: f64 = 10.0;

/// Default floor for [`ChunkSelector::filter_by_min_score`]
pub const DEFAULT_MIN_SCORE: u32 = 30;

/// Container extensions accepted at the upload boundary
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv"];

/// Default upload ceiling: 500 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Per-factor view of an engagement score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub word_count: usize,
    pub duration: f64,
    pub density: f64,
    pub volume: f64,
    pub coverage: f64,
    pub segments: f64,
    pub total: u32,
}

impl ScoreBreakdown {
    fn empty(word_count: usize, duration: f64) -> Self {
        Self {
            word_count,
            duration,
            density: 0.0,
            volume: 0.0,
            coverage: 0.0,
            segments: 0.0,
            total: 0,
        }
    }
}

/// Engagement heuristic over a chunk's transcript
pub struct EngagementScorer;

impl EngagementScorer {
    /// Score a transcript.
    ///
    /// Duration is the end of the last utterance rather than the chunk's
    /// physical length. Degenerate transcripts (no words or zero duration)
    /// score 0.
    pub fn score_segments(segments: &[TranscriptSegment]) -> ScoreBreakdown {
        let word_count: usize = segments.iter().map(TranscriptSegment::word_count).sum();
        let duration = segments.last().map(|s| s.end).unwrap_or(0.0);

        if duration <= 0.0 || word_count == 0 {
            return ScoreBreakdown::empty(word_count, duration.max(0.0));
        }

        let words = word_count as f64;
        let density = clamp_unit(words / duration / IDEAL_WORDS_PER_SECOND) * DENSITY_WEIGHT;
        let volume = clamp_unit(words / FULL_WORD_COUNT) * VOLUME_WEIGHT;

        let speech: f64 = segments.iter().map(TranscriptSegment::span).sum();
        let coverage = clamp_unit(speech / duration) * COVERAGE_WEIGHT;

        let segment_factor =
            clamp_unit(segments.len() as f64 / FULL_SEGMENT_COUNT) * SEGMENT_WEIGHT;

        let total = (density + volume + coverage + segment_factor).round() as u32;

        ScoreBreakdown {
            word_count,
            duration,
            density,
            volume,
            coverage,
            segments: segment_factor,
            total,
        }
    }

    /// Score already-parsed segments that were read from `subtitle_path`
    pub fn score_parsed(
        chunk: &Chunk,
        subtitle_path: &Path,
        segments: &[TranscriptSegment],
    ) -> ChunkScore {
        let breakdown = Self::score_segments(segments);
        ChunkScore {
            chunk: chunk.clone(),
            subtitle_path: Some(subtitle_path.to_path_buf()),
            score: breakdown.total,
            word_count: breakdown.word_count,
            duration: breakdown.duration,
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Ranking of scored chunks
pub struct ChunkSelector;

impl ChunkSelector {
    /// Pick the `count` highest-scoring chunks.
    ///
    /// The sort is stable, so equal scores keep their input (chunk) order.
    pub fn pick_top(scores: &[ChunkScore], count: usize) -> Vec<ChunkScore> {
        let mut ranked = scores.to_vec();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(count);
        ranked
    }

    /// Drop chunks scoring below `min_score`, preserving order
    pub fn filter_by_min_score(scores: &[ChunkScore], min_score: u32) -> Vec<ChunkScore> {
        scores
            .iter()
            .filter(|s| s.score >= min_score)
            .cloned()
            .collect()
    }
}

/// Upload checks applied before a job is created
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadPolicy {
    /// Check the extension only
    pub fn check_extension(&self, path: &Path) -> Result<(), InputValidationError> {
        let extension = PathUtils::get_extension(path).unwrap_or_default();

        if self
            .allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            Ok(())
        } else {
            Err(InputValidationError::UnsupportedFormat {
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
                allowed: self
                    .allowed_extensions
                    .iter()
                    .map(|e| format!(".{}", e))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
        }
    }

    /// Check the size against the ceiling
    pub fn check_size(&self, size: u64) -> Result<(), InputValidationError> {
        if size > self.max_bytes {
            return Err(InputValidationError::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Validate a file on disk: extension first, then existence and size
    pub fn validate(&self, path: &Path) -> Result<(), InputValidationError> {
        self.check_extension(path)?;
        let metadata = std::fs::metadata(path)
            .map_err(|_| InputValidationError::NotFound(path.to_path_buf()))?;
        if !metadata.is_file() {
            return Err(InputValidationError::NotFound(path.to_path_buf()));
        }
        self.check_size(metadata.len())
    }
}
