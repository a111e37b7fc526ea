//! Binary-level tests for the `reels` command

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn reels(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reels").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("AUTOREELS_CONFIG")
        .env_remove("OPENAI_API_KEY");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = tempfile::tempdir().unwrap();
    reels(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("score"))
        .stdout(predicate::str::contains("probe"));
}

#[test]
fn test_score_prints_breakdown_json() {
    let dir = tempfile::tempdir().unwrap();
    let srt = dir.path().join("chunk_001.srt");
    std::fs::write(
        &srt,
        "1\n00:00:00,000 --> 00:00:10,000\none two three four five six seven eight nine ten\n\n\
         2\n00:00:10,000 --> 00:00:20,000\neleven twelve thirteen fourteen fifteen sixteen seventeen eighteen nineteen twenty\n\n",
    )
    .unwrap();

    let output = reels(&dir)
        .args(["score", "--srt"])
        .arg(&srt)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["segment_count"], 2);
    assert_eq!(json["word_count"], 20);
    // density 16 + volume 12 + coverage 20 + segments 2
    assert_eq!(json["total"], 50);
}

#[test]
fn test_process_rejects_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, b"not a video").unwrap();

    reels(&dir)
        .args(["process", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("input_validation_error"))
        .stdout(predicate::str::contains(".mp4"));
}

#[test]
fn test_process_rejects_missing_input() {
    let dir = tempfile::tempdir().unwrap();

    reels(&dir)
        .args(["process", "--input", "missing.mp4"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("input_validation_error"))
        .stdout(predicate::str::contains("missing.mp4"));
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("autoreels.toml"), "[reels]\ntop_count = 0\n").unwrap();

    reels(&dir)
        .args(["score", "--srt", "whatever.srt"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("config_error"));
}

#[test]
fn test_unknown_log_format_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    reels(&dir)
        .args(["--log-format", "xml", "score", "--srt", "a.srt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_failed_job_reports_generated_job_id() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.mp4");
    std::fs::write(&input, b"definitely not a video").unwrap();

    let output = reels(&dir)
        .args(["process", "--input"])
        .arg(&input)
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "media_tool_error");
    let job_id = json["job_id"].as_str().expect("job id is reported");
    assert!(job_id.parse::<i64>().is_ok());
}
