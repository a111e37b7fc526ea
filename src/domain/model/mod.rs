// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};


/// Nominal chunk length in seconds
pub const DEFAULT_CHUNK_SECONDS: u32 = 20;

/// Default number of reels produced per job
pub const DEFAULT_TOP_COUNT: usize = 3;

/// Prefix shared by every chunk file name
pub const CHUNK_PREFIX: &str = "chunk_";

/// Container used for chunks and reels
pub const CHUNK_EXTENSION: &str = "mp4";

/// One processing request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    /// Job identifier, also the name of its working and output directories
    pub id: String,
    /// Source video path
    pub source: PathBuf,
    /// Per-job scratch directory
    pub work_dir: PathBuf,
    /// Directory receiving chunk files and their derived audio/subtitles
    pub chunks_dir: PathBuf,
    /// Directory receiving the reels
    pub output_dir: PathBuf,
    /// Desired number of reels
    pub top_count: usize,
}

impl Job {
    /// Lay out a job under the given work and output roots.
    ///
    /// Work files go to `<work_root>/<id>/chunks`, reels to `<output_root>/<id>`,
    /// so concurrent jobs never share a directory.
    pub fn new(
        id: impl Into<String>,
        source: impl Into<PathBuf>,
        work_root: &Path,
        output_root: &Path,
        top_count: usize,
    ) -> Self {
        let id = id.into();
        let work_dir = work_root.join(&id);
        Self {
            chunks_dir: work_dir.join("chunks"),
            output_dir: output_root.join(&id),
            work_dir,
            source: source.into(),
            top_count,
            id,
        }
    }

    /// Generate a job id from the current wall-clock time in milliseconds
    pub fn generate_id() -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }
}

/// One fixed-length slice of the source video.
///
/// Chunks are created once by the segmenter and never mutated; later stages
/// write new files next to the chunk instead of touching it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position in the source
    pub index: u32,
    /// Resolved path of the chunk file
    pub path: PathBuf,
    /// Nominal chunk length used to derive the start offset
    pub nominal_seconds: u32,
}

impl Chunk {
    pub fn new(index: u32, path: impl Into<PathBuf>, nominal_seconds: u32) -> Self {
        Self {
            index,
            path: path.into(),
            nominal_seconds,
        }
    }

    /// File name for the chunk with the given index
    pub fn file_name(index: u32) -> String {
        format!("{}{:03}.{}", CHUNK_PREFIX, index, CHUNK_EXTENSION)
    }

    /// Output pattern handed to the segmenting tool
    pub fn file_pattern() -> String {
        format!("{}%03d.{}", CHUNK_PREFIX, CHUNK_EXTENSION)
    }

    /// Recover the index from a chunk file name such as `chunk_007.mp4`
    pub fn parse_index(file_name: &str) -> Option<u32> {
        let stem = file_name
            .strip_prefix(CHUNK_PREFIX)?
            .strip_suffix(CHUNK_EXTENSION)?
            .strip_suffix('.')?;
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        stem.parse().ok()
    }

    /// Offset of this chunk within the source, in seconds
    pub fn start_offset(&self) -> f64 {
        f64::from(self.index) * f64::from(self.nominal_seconds)
    }

    /// Path of the mono 16 kHz audio extracted for transcription
    pub fn audio_path(&self) -> PathBuf {
        self.path.with_extension("wav")
    }

    /// Path of the subtitle track written for this chunk
    pub fn subtitle_path(&self) -> PathBuf {
        self.path.with_extension("srt")
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk #{} ({})", self.index, self.path.display())
    }
}

/// One utterance in a chunk's transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Spoken text
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Length of the utterance, never negative
    pub fn span(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Number of whitespace-delimited words
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Evaluation of one chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkScore {
    /// Chunk being scored
    pub chunk: Chunk,
    /// Subtitle track, absent when no usable transcript exists
    pub subtitle_path: Option<PathBuf>,
    /// Engagement score in [0, 100]
    pub score: u32,
    /// Total words across the transcript
    pub word_count: usize,
    /// End of the last utterance, in seconds
    pub duration: f64,
}

impl ChunkScore {
    /// Score for a chunk without a usable transcript
    pub fn silent(chunk: Chunk) -> Self {
        Self {
            chunk,
            subtitle_path: None,
            score: 0,
            word_count: 0,
            duration: 0.0,
        }
    }
}

/// A finished vertical clip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reel {
    /// 1-based selection rank, 1 being the highest-scoring chunk
    pub rank: usize,
    /// Cropped intermediate
    pub vertical_path: PathBuf,
    /// Deliverable
    pub final_path: PathBuf,
    /// Whether captions were burned into the deliverable
    pub captioned: bool,
    /// Score of the source chunk
    pub score: ChunkScore,
}

/// Outcome of inspecting a chunk for audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioPresence {
    Present,
    Absent,
}

impl AudioPresence {
    pub fn is_present(self) -> bool {
        self == AudioPresence::Present
    }
}

/// Successful outcome of transcribing a chunk
#[derive(Debug, Clone, PartialEq)]
pub enum Transcription {
    /// Speech was found and written as a subtitle track
    Captioned {
        subtitle_path: PathBuf,
        segments: Vec<TranscriptSegment>,
    },
    /// The service heard nothing
    Silent,
}

impl Transcription {
    pub fn subtitle_path(&self) -> Option<&Path> {
        match self {
            Transcription::Captioned { subtitle_path, .. } => Some(subtitle_path),
            Transcription::Silent => None,
        }
    }
}

/// Lifecycle of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Created,
    Segmenting,
    ScoringChunks,
    Selecting,
    Rendering,
    Completed,
    /// Segmentation failed or the job's directories were already in use;
    /// no later stage can fail the job
    Failed,
    /// Cancellation token fired while running
    Cancelled,
}

impl JobState {
    /// Whether the job can move from `self` to `next`
    pub fn can_transition_to(self, next: JobState) -> bool {
        use JobState::*;
        match (self, next) {
            (Created, Segmenting)
            | (Segmenting, ScoringChunks)
            | (Segmenting, Failed)
            | (ScoringChunks, Selecting)
            | (Selecting, Rendering)
            | (Rendering, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed | JobState::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Created => "created",
            JobState::Segmenting => "segmenting",
            JobState::ScoringChunks => "scoring_chunks",
            JobState::Selecting => "selecting",
            JobState::Rendering => "rendering",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Everything a completed job hands back
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobResult {
    pub job_id: String,
    /// Reels in rank order
    pub reels: Vec<Reel>,
    /// Score of every chunk, in chunk order
    pub chunk_scores: Vec<ChunkScore>,
}

impl JobResult {
    /// Deliverable paths in rank order
    pub fn final_videos(&self) -> Vec<&Path> {
        self.reels.iter().map(|r| r.final_path.as_path()).collect()
    }
}
