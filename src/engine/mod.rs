//! Pipeline stages driven through the media tool and transcription ports

use serde::Serialize;

pub mod audio_probe;
pub mod renderer;
pub mod segmenter;
pub mod transcriber;

pub use audio_probe::AudioProber;
pub use renderer::Renderer;
pub use segmenter::Segmenter;
pub use transcriber::ChunkTranscriber;

/// Numbered steps reported while a job runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStep {
    /// Splitting the source
    Split,
    /// Probing, transcribing and scoring every chunk
    Score,
    /// Ranking chunk scores
    Select,
    /// Cropping and captioning the selection
    Render,
}

impl PipelineStep {
    pub const TOTAL: usize = 6;

    /// Position shown in progress lines; scoring covers steps 2 to 4
    pub fn number(self) -> usize {
        match self {
            PipelineStep::Split => 1,
            PipelineStep::Score => 2,
            PipelineStep::Select => 5,
            PipelineStep::Render => 6,
        }
    }

    /// Progress prefix such as `[1/6]`
    pub fn prefix(self) -> String {
        format!("[{}/{}]", self.number(), Self::TOTAL)
    }
}
