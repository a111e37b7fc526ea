//! Whisper adapter against a mock HTTP server

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autoreels::adapters::toml_config::TranscriptionConfig;
use autoreels::adapters::WhisperApiAdapter;
use autoreels::ports::TranscriptionPort;
use autoreels::{TranscriptSegment, TranscriptionServiceError};

fn adapter_for(server: &MockServer) -> WhisperApiAdapter {
    let config = TranscriptionConfig {
        base_url: format!("{}/v1", server.uri()),
        api_key: Some("sk-test".to_string()),
        request_timeout_secs: 5,
        ..TranscriptionConfig::default()
    };
    WhisperApiAdapter::new(&config).unwrap()
}

fn audio_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chunk_000.wav");
    std::fs::write(&path, b"RIFF....WAVEfmt ").unwrap();
    (dir, path)
}

async fn transcribe(server: &MockServer) -> Result<Vec<TranscriptSegment>, TranscriptionServiceError> {
    let (_dir, audio) = audio_file();
    adapter_for(server)
        .transcribe(&audio, &CancellationToken::new())
        .await
}

#[tokio::test]
async fn test_verbose_json_segments_are_returned() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("verbose_json"))
        .and(body_string_contains("whisper-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "hello there general kenobi",
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.2, "text": " hello there"},
                {"id": 1, "start": 1.2, "end": 2.8, "text": " general kenobi"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let segments = transcribe(&server).await.unwrap();

    assert_eq!(
        segments,
        vec![
            TranscriptSegment::new(0.0, 1.2, " hello there"),
            TranscriptSegment::new(1.2, 2.8, " general kenobi"),
        ]
    );
}

#[tokio::test]
async fn test_missing_segments_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": ""})))
        .mount(&server)
        .await;

    assert!(transcribe(&server).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unauthorized_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = transcribe(&server).await.unwrap_err();
    assert!(matches!(err, TranscriptionServiceError::Auth { status: 401 }));
}

#[tokio::test]
async fn test_rate_limit_is_quota_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = transcribe(&server).await.unwrap_err();
    assert!(matches!(err, TranscriptionServiceError::Quota { ref body } if body == "slow down"));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = transcribe(&server).await.unwrap_err();
    assert!(matches!(err, TranscriptionServiceError::Status { status: 503, .. }));
    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = transcribe(&server).await.unwrap_err();
    assert!(matches!(err, TranscriptionServiceError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_cancellation_aborts_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"segments": []}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let (_dir, audio) = audio_file();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = adapter_for(&server).transcribe(&audio, &cancel).await.unwrap_err();
    assert!(matches!(err, TranscriptionServiceError::Cancelled));
}
