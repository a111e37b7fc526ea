// TOML config adapter - Pipeline configuration from files and environment

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::{DEFAULT_CHUNK_SECONDS, DEFAULT_TOP_COUNT};
use crate::domain::rules::{UploadPolicy, ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::{ReelsError, ReelsResult};

/// Files searched, in order, when no explicit config path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["config/autoreels.toml", "autoreels.toml"];

/// Environment variable holding the transcription API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Nominal chunk length in seconds
    pub chunk_seconds: u32,
    /// Number of reels to produce
    pub top_count: usize,
    /// Optional score floor applied before selection
    pub min_score: Option<u32>,
    /// Concurrent probe/transcribe/score units
    pub max_parallel_chunks: usize,
    /// Concurrent renders
    pub max_parallel_renders: usize,
    /// Kill external tools that run longer than this
    pub tool_timeout_secs: Option<u64>,
    /// Explicit ffmpeg binary, otherwise looked up on PATH
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit ffprobe binary, otherwise looked up on PATH
    pub ffprobe_path: Option<PathBuf>,
    /// Root for per-job scratch directories
    pub work_dir: PathBuf,
    /// Root for per-job output directories
    pub output_dir: PathBuf,
    pub transcription: TranscriptionConfig,
    pub upload: UploadConfig,
    pub render: RenderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let cores = num_cpus::get().max(1);
        Self {
            chunk_seconds: DEFAULT_CHUNK_SECONDS,
            top_count: DEFAULT_TOP_COUNT,
            min_score: None,
            max_parallel_chunks: cores.min(8),
            max_parallel_renders: (cores / 2).clamp(1, 4),
            tool_timeout_secs: Some(600),
            ffmpeg_path: None,
            ffprobe_path: None,
            work_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("output"),
            transcription: TranscriptionConfig::default(),
            upload: UploadConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// Speech-to-text service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    pub model: String,
    /// Never written back out; normally supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "whisper-1".to_string(),
            api_key: None,
            request_timeout_secs: 120,
        }
    }
}

/// Upload boundary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub allowed_extensions: Vec<String>,
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadConfig {
    pub fn policy(&self) -> UploadPolicy {
        UploadPolicy {
            allowed_extensions: self.allowed_extensions.clone(),
            max_bytes: self.max_bytes,
        }
    }
}

/// Output canvas and caption style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub outline: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            font_size: 28,
            outline: 2,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    reels: PipelineConfig,
}

impl PipelineConfig {
    /// Parse the `[reels]` table of a TOML document
    pub fn from_toml_str(content: &str) -> ReelsResult<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ReelsError::Config {
            message: format!("Failed to parse TOML config: {}", e),
        })?;
        Ok(file.reels)
    }

    /// Apply `AUTOREELS_*` overrides and the API key from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> ReelsResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;

        macro_rules! override_parsed {
            ($var:literal, $field:expr) => {
                if let Some(raw) = lookup($var) {
                    $field = parse_env($var, &raw)?;
                    debug!("Environment override: {} = {}", $var, raw);
                    applied += 1;
                }
            };
        }

        override_parsed!("AUTOREELS_TOP_COUNT", self.top_count);
        override_parsed!("AUTOREELS_CHUNK_SECONDS", self.chunk_seconds);
        override_parsed!("AUTOREELS_MAX_PARALLEL_CHUNKS", self.max_parallel_chunks);
        override_parsed!("AUTOREELS_MAX_PARALLEL_RENDERS", self.max_parallel_renders);

        if let Some(raw) = lookup("AUTOREELS_TOOL_TIMEOUT_SECS") {
            let secs: u64 = parse_env("AUTOREELS_TOOL_TIMEOUT_SECS", &raw)?;
            self.tool_timeout_secs = (secs > 0).then_some(secs);
            applied += 1;
        }
        if let Some(raw) = lookup("AUTOREELS_MIN_SCORE") {
            self.min_score = Some(parse_env("AUTOREELS_MIN_SCORE", &raw)?);
            applied += 1;
        }
        if let Some(raw) = lookup("AUTOREELS_FFMPEG_PATH") {
            self.ffmpeg_path = Some(PathBuf::from(raw));
            applied += 1;
        }
        if let Some(raw) = lookup("AUTOREELS_FFPROBE_PATH") {
            self.ffprobe_path = Some(PathBuf::from(raw));
            applied += 1;
        }
        if let Some(raw) = lookup("AUTOREELS_WORK_DIR") {
            self.work_dir = PathBuf::from(raw);
            applied += 1;
        }
        if let Some(raw) = lookup("AUTOREELS_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(raw);
            applied += 1;
        }
        if let Some(raw) = lookup("AUTOREELS_TRANSCRIPTION_URL") {
            self.transcription.base_url = raw;
            applied += 1;
        }
        if let Some(raw) = lookup("AUTOREELS_TRANSCRIPTION_MODEL") {
            self.transcription.model = raw;
            applied += 1;
        }
        if let Some(raw) = lookup(API_KEY_ENV) {
            if !raw.trim().is_empty() {
                self.transcription.api_key = Some(raw);
                applied += 1;
            }
        }

        Ok(applied)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> ReelsResult<()> {
        let invalid = |message: &str| {
            Err(ReelsError::Config {
                message: message.to_string(),
            })
        };

        if self.top_count == 0 {
            return invalid("top_count must be at least 1");
        }
        if self.chunk_seconds == 0 {
            return invalid("chunk_seconds must be greater than 0");
        }
        if self.max_parallel_chunks == 0 || self.max_parallel_renders == 0 {
            return invalid("parallelism limits must be at least 1");
        }
        if matches!(self.min_score, Some(s) if s > 100) {
            return invalid("min_score cannot exceed 100");
        }
        if self.render.width == 0 || self.render.height == 0 {
            return invalid("render canvas must be non-empty");
        }
        if self.upload.allowed_extensions.is_empty() {
            return invalid("at least one upload extension must be allowed");
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, raw: &str) -> ReelsResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ReelsError::Config {
        message: format!("Invalid value for {}: {} ({})", var, raw, e),
    })
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    search_paths: Vec<PathBuf>,
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter using the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Create an adapter that searches the given paths instead
    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Load from an explicit file, or the first search path that exists, or defaults
    pub fn load(&self, explicit: Option<&Path>) -> ReelsResult<PipelineConfig> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        for path in &self.search_paths {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(PipelineConfig::default())
    }

    fn load_file(path: &Path) -> ReelsResult<PipelineConfig> {
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| ReelsError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        PipelineConfig::from_toml_str(&content)
    }

}
