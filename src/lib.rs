//! AutoReels segment pipeline library
//!
//! Splits a long video into fixed-length chunks, transcribes and scores each
//! chunk for engagement, and renders the best ones as vertical reels with
//! burned-in captions. External tools (ffmpeg, ffprobe) and the speech-to-text
//! service sit behind the traits in [`ports`].

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod subtitles;
pub mod utils;

// Re-export commonly used types
pub use adapters::toml_config::PipelineConfig;
pub use app::PipelineInteractor;
pub use domain::errors::{
    InputValidationError, MediaToolError, ProbeError, TranscribeError, TranscriptionServiceError,
};
pub use domain::model::{Chunk, ChunkScore, Job, JobResult, JobState, Reel, TranscriptSegment};
pub use error::{ReelsError, ReelsResult};
