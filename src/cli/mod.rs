//! CLI module for AutoReels
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

pub use args::{ProbeArgs, ProcessArgs, ScoreArgs};

/// AutoReels segment pipeline
///
/// Splits a long video into chunks, transcribes and scores each one, and
/// renders the most engaging chunks as captioned vertical reels.
#[derive(Parser, Debug)]
#[command(name = "reels")]
#[command(about = "AutoReels - Turn long videos into captioned vertical reels")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: config/autoreels.toml, then autoreels.toml)
    #[arg(long, env = "AUTOREELS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormat,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Turn a video into ranked, captioned vertical reels
    Process(args::ProcessArgs),
    /// Score a single subtitle file
    Score(args::ScoreArgs),
    /// Report whether a media file has usable audio
    Probe(args::ProbeArgs),
}
