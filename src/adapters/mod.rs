// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod toml_config;
pub mod transcribe_whisper;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use toml_config::TomlConfigAdapter;
pub use transcribe_whisper::WhisperApiAdapter;
