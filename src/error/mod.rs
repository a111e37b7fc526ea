//! Error handling module for AutoReels
//!
//! Only the conditions that end a job live here. Per-chunk failures are
//! converted into degraded results inside the pipeline and never reach this type.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::errors::{InputValidationError, MediaToolError};

/// Job-level error for AutoReels operations
#[derive(Error, Debug)]
pub enum ReelsError {
    /// Source could not be split into chunks
    #[error("Segmentation failed: {0}")]
    Segmentation(#[source] MediaToolError),

    /// Upload rejected before processing
    #[error(transparent)]
    InputValidation(#[from] InputValidationError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A job directory already holds files from an earlier run with the same id
    #[error("Job {job_id} cannot use {dir}: directory is not empty")]
    WorkspaceInUse { job_id: String, dir: PathBuf },

    /// The job was cancelled while running
    #[error("Job {job_id} was cancelled")]
    Cancelled { job_id: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelsError {
    /// Short machine-readable code for the structured error report
    pub fn code(&self) -> &'static str {
        match self {
            ReelsError::Segmentation(_) => "media_tool_error",
            ReelsError::InputValidation(_) => "input_validation_error",
            ReelsError::Config { .. } => "config_error",
            ReelsError::WorkspaceInUse { .. } => "workspace_in_use",
            ReelsError::Cancelled { .. } => "cancelled",
            ReelsError::Io(_) => "io_error",
        }
    }
}

/// Result type alias for AutoReels operations
pub type ReelsResult<T> = std::result::Result<T, ReelsError>;
