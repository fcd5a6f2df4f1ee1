//! HTTP endpoint integration tests
//!
//! Exercises the orchestration pipeline against stub engines, without real
//! model binaries.

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::time::{Duration, SystemTime};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

mod common;
use common::{STUB_AUDIO_SIZE, StubLlm, StubStt, StubTts, TestRelay, body_json, upload_request, upload_request_named};

#[tokio::test]
async fn root_reports_liveness() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("running"));
}

#[tokio::test]
async fn unsupported_extension_is_rejected_before_any_engine_runs() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(upload_request("voice.ogg", b"not audio"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Unsupported file type.");

    assert_eq!(relay.stt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(relay.llm_calls.load(Ordering::SeqCst), 0);
    assert_eq!(relay.tts_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn uppercase_extension_is_accepted() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(upload_request("Voice.WAV", b"RIFF"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_file_field_is_a_client_error() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(upload_request_named("attachment", "voice.wav", b"RIFF"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("missing file"));
    assert_eq!(relay.stt_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stt_failure_stops_the_pipeline() {
    let relay = TestRelay::with(StubStt::failing(), StubLlm::ok("unused"), StubTts::ok());

    let response = relay
        .router()
        .oneshot(upload_request("voice.wav", b"RIFF"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["detail"].as_str().unwrap().contains("STT error"));

    assert_eq!(relay.stt_calls.load(Ordering::SeqCst), 1);
    assert_eq!(relay.llm_calls.load(Ordering::SeqCst), 0);
    assert_eq!(relay.tts_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn llm_failure_stops_before_synthesis() {
    let relay = TestRelay::with(StubStt::ok("hello"), StubLlm::failing(), StubTts::ok());

    let response = relay
        .router()
        .oneshot(upload_request("voice.wav", b"RIFF"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(relay.llm_calls.load(Ordering::SeqCst), 1);
    assert_eq!(relay.tts_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tts_failure_publishes_nothing() {
    let relay = TestRelay::with(StubStt::ok("hello"), StubLlm::ok("hi"), StubTts::failing());

    let response = relay
        .router()
        .oneshot(upload_request("voice.wav", b"RIFF"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(relay.tts_calls.load(Ordering::SeqCst), 1);

    let published = std::fs::read_dir(relay.audio_dir.path()).unwrap().count();
    assert_eq!(published, 0);
}

#[tokio::test]
async fn successful_pipeline_round_trip() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(upload_request("voice.wav", b"RIFF"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    // Engine outputs are trimmed
    assert_eq!(json["transcription"], "hello world");
    assert_eq!(json["response"], "Hi there!");

    let audio_url = json["audio_url"].as_str().unwrap();
    let name = audio_url.strip_prefix("/audio/").unwrap();

    // The published artifact exists and carries the stub's fixed size
    let published = relay.audio_dir.path().join(name);
    assert_eq!(std::fs::metadata(&published).unwrap().len() as usize, STUB_AUDIO_SIZE);

    // And it is fetchable through the static mount
    let fetched = relay
        .router()
        .oneshot(Request::builder().uri(audio_url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(fetched.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.len(), STUB_AUDIO_SIZE);
}

#[tokio::test]
async fn unknown_artifact_is_not_found() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(
            Request::builder()
                .uri("/audio/no-such-file.wav")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_requests_publish_distinct_artifacts() {
    let relay = TestRelay::happy();
    let router = relay.router();

    let requests = (0..100).map(|_| {
        let app = router.clone();
        async move {
            let response = app.oneshot(upload_request("voice.wav", b"RIFF")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            json["audio_url"].as_str().unwrap().to_string()
        }
    });

    let urls: Vec<String> = futures::future::join_all(requests).await;
    let distinct: HashSet<&String> = urls.iter().collect();
    assert_eq!(distinct.len(), 100);

    let published = std::fs::read_dir(relay.audio_dir.path()).unwrap().count();
    assert_eq!(published, 100);
}

/// Backdate a published artifact by `hours`
fn age_artifact(path: &std::path::Path, hours: u64) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(hours * 3600))
        .unwrap();
}

#[tokio::test]
async fn cleanup_sweeps_once_then_reports_zero() {
    let relay = TestRelay::happy();

    // Publish one artifact, then make it stale
    let response = relay
        .router()
        .oneshot(upload_request("voice.wav", b"RIFF"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entry = std::fs::read_dir(relay.audio_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    age_artifact(&entry.path(), 30);

    let first = relay
        .router()
        .oneshot(Request::builder().uri("/cleanup").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["message"], "Deleted 1 old audio files");

    // Nothing new published in between: second sweep is a no-op
    let second = relay
        .router()
        .oneshot(Request::builder().uri("/cleanup").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(second).await["message"], "Deleted 0 old audio files");
}

#[tokio::test]
async fn cleanup_survives_extreme_max_age_values() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(upload_request("voice.wav", b"RIFF"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // u64::MAX hours: the threshold saturates and nothing qualifies
    let sweep = relay
        .router()
        .oneshot(
            Request::builder()
                .uri("/cleanup?max_age_hours=18446744073709551615")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(sweep.status(), StatusCode::OK);
    assert_eq!(body_json(sweep).await["message"], "Deleted 0 old audio files");

    let published = std::fs::read_dir(relay.audio_dir.path()).unwrap().count();
    assert_eq!(published, 1);
}

#[tokio::test]
async fn cleanup_honours_max_age_query() {
    let relay = TestRelay::happy();

    let response = relay
        .router()
        .oneshot(upload_request("voice.wav", b"RIFF"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entry = std::fs::read_dir(relay.audio_dir.path())
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    age_artifact(&entry.path(), 2);

    // Two hours old: survives the default threshold, not a one-hour one
    let default_sweep = relay
        .router()
        .oneshot(Request::builder().uri("/cleanup").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(default_sweep).await["message"], "Deleted 0 old audio files");

    let tight_sweep = relay
        .router()
        .oneshot(
            Request::builder()
                .uri("/cleanup?max_age_hours=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(tight_sweep).await["message"], "Deleted 1 old audio files");
}
