//! AutoReels CLI
//!
//! Turns one long video into a handful of captioned vertical reels.
//!
//! # Usage
//!
//! ```bash
//! reels process --input talk.mp4 --count 3
//! reels score --srt temp/1700000000000/chunks/chunk_004.srt
//! reels probe --input temp/1700000000000/chunks/chunk_004.mp4
//! ```
//!
//! The JSON report goes to stdout; logs go to stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use autoreels::cli::{commands, Cli, Commands};
use autoreels::config_initialization::initialize_configuration_hierarchy;
use autoreels::domain::model::Job;
use autoreels::error::ReelsError;
use autoreels::output::ErrorReport;
use autoreels::utils::logging::{LoggingConfig, LoggingSystem};

/// Main entry point for the AutoReels CLI application
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let mut cli = Cli::parse();

    let logging = LoggingSystem::new(LoggingConfig {
        level: cli.log_level,
        format: cli.log_format,
        ..LoggingConfig::default()
    });
    logging
        .initialize()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    logging.log_system_info();

    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling job");
            ctrl_c_token.cancel();
        }
    });

    let job_id = match &mut cli.command {
        Commands::Process(args) => Some(args.job_id.get_or_insert_with(Job::generate_id).clone()),
        _ => None,
    };

    match execute(&cli, &cancel).await {
        Ok(()) => {
            info!("AutoReels completed successfully");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!(code = e.code(), "{}", e);
            print_json(&ErrorReport::new(job_id, &e))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Execute the requested command and print its report
async fn execute(cli: &Cli, cancel: &CancellationToken) -> Result<(), ReelsError> {
    let config = initialize_configuration_hierarchy(cli)?;

    match &cli.command {
        Commands::Process(args) => {
            info!("Executing process command");
            let container = commands::default_container(&config)?;
            let report = commands::process(args, &config, &container, cancel).await?;
            print_json(&report).map_err(to_io)?;
        }
        Commands::Score(args) => {
            info!("Executing score command");
            let report = commands::score(args).await?;
            print_json(&report).map_err(to_io)?;
        }
        Commands::Probe(args) => {
            info!("Executing probe command");
            let container = commands::default_container(&config)?;
            let report = commands::probe(args, &container, cancel).await?;
            print_json(&report).map_err(to_io)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", json);
    Ok(())
}

fn to_io(e: anyhow::Error) -> ReelsError {
    ReelsError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}
