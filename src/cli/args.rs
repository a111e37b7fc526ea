//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Source video (mp4, mov, avi or mkv)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of reels to produce
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub count: Option<u16>,

    /// Root for per-job scratch directories
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Root for per-job output directories
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip chunks scoring below this value (0-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub min_score: Option<u32>,

    /// Job identifier (default: current time in milliseconds)
    #[arg(long)]
    pub job_id: Option<String>,
}

/// Arguments for the score command
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Subtitle file to score
    #[arg(long)]
    pub srt: PathBuf,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(short, long)]
    pub input: PathBuf,
}
