//! Configuration initialization and hierarchy management

use tracing::{debug, info};

use crate::adapters::toml_config::{PipelineConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands, ProcessArgs};
use crate::error::ReelsResult;

/// Build the effective configuration following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> ReelsResult<PipelineConfig> {
    initialize_with_env(cli, |key| std::env::var(key).ok())
}

/// Same as [`initialize_configuration_hierarchy`] with an injectable environment
pub fn initialize_with_env<F>(cli: &Cli, env: F) -> ReelsResult<PipelineConfig>
where
    F: Fn(&str) -> Option<String>,
{
    debug!("Initializing configuration hierarchy");

    // Defaults, then file
    let mut config = TomlConfigAdapter::new().load(cli.config.as_deref())?;

    let env_overrides = config.apply_env(env)?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    if let Commands::Process(args) = &cli.command {
        let cli_overrides = apply_cli_configuration_overrides(&mut config, args);
        if cli_overrides > 0 {
            info!("Applied {} CLI configuration overrides", cli_overrides);
        }
    }

    config.validate()?;
    Ok(config)
}

/// Apply `process` flags on top of the loaded configuration
pub fn apply_cli_configuration_overrides(config: &mut PipelineConfig, args: &ProcessArgs) -> usize {
    let mut cli_overrides = 0;

    if let Some(count) = args.count {
        debug!("CLI override: top_count = {}", count);
        config.top_count = usize::from(count);
        cli_overrides += 1;
    }
    if let Some(dir) = &args.work_dir {
        debug!("CLI override: work_dir = {}", dir.display());
        config.work_dir = dir.clone();
        cli_overrides += 1;
    }
    if let Some(dir) = &args.output_dir {
        debug!("CLI override: output_dir = {}", dir.display());
        config.output_dir = dir.clone();
        cli_overrides += 1;
    }
    if let Some(min_score) = args.min_score {
        debug!("CLI override: min_score = {}", min_score);
        config.min_score = Some(min_score);
        cli_overrides += 1;
    }

    cli_overrides
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_cli_beats_env_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("autoreels.toml");
        std::fs::write(&file, "[reels]\ntop_count = 2\nchunk_seconds = 15\nwork_dir = \"/file/work\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "reels",
            "--config",
            file.to_str().unwrap(),
            "process",
            "--input",
            "a.mp4",
            "--count",
            "4",
        ])
        .unwrap();

        let config = initialize_with_env(&cli, |key| match key {
            "AUTOREELS_TOP_COUNT" => Some("9".to_string()),
            "AUTOREELS_WORK_DIR" => Some("/env/work".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.top_count, 4);
        assert_eq!(config.work_dir, PathBuf::from("/env/work"));
        assert_eq!(config.chunk_seconds, 15);
    }

    #[test]
    fn test_invalid_env_is_rejected() {
        let cli = Cli::try_parse_from(["reels", "score", "--srt", "a.srt"]).unwrap();
        let result = initialize_with_env(&cli, |key| {
            (key == "AUTOREELS_CHUNK_SECONDS").then(|| "0".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let cli = Cli::try_parse_from(["reels", "--config", "/no/such/autoreels.toml", "score", "--srt", "a.srt"])
            .unwrap();
        assert!(initialize_with_env(&cli, no_env).is_err());
    }

    #[test]
    fn test_cli_overrides_count() {
        let cli = Cli::try_parse_from(["reels", "process", "--input", "a.mp4", "--min-score", "30", "-o", "out"]).unwrap();
        let Commands::Process(args) = &cli.command else {
            panic!("expected process");
        };
        let mut config = PipelineConfig::default();
        assert_eq!(apply_cli_configuration_overrides(&mut config, args), 2);
        assert_eq!(config.min_score, Some(30));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
