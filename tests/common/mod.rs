//! Shared test helpers: stub engines and multipart request bodies

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use uuid::Uuid;

use voicechat_relay::api::ApiState;
use voicechat_relay::engine::{ResponseGenerator, SpeechSynthesizer, SpeechToText};
use voicechat_relay::{Error, Result};

/// Size of every artifact the stub synthesizer writes
pub const STUB_AUDIO_SIZE: usize = 512;

/// Recognizer double: fixed transcript or fixed failure, counts calls
pub struct StubStt {
    transcript: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl StubStt {
    pub fn ok(transcript: &str) -> Self {
        Self {
            transcript: Some(transcript.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            transcript: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SpeechToText for StubStt {
    async fn transcribe(&self, _audio: &[u8], _extension: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcript
            .clone()
            .ok_or_else(|| Error::Stt("stub recognizer failure".to_string()))
    }
}

/// Generator double: fixed reply or fixed failure, counts calls
pub struct StubLlm {
    reply: Option<String>,
    pub calls: Arc<AtomicUsize>,
}

impl StubLlm {
    pub fn ok(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ResponseGenerator for StubLlm {
    async fn generate(&self, _text: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply
            .clone()
            .ok_or_else(|| Error::Generate("stub generator failure".to_string()))
    }
}

/// Synthesizer double: writes a fixed-size file per call, counts calls
pub struct StubTts {
    dir: Option<tempfile::TempDir>,
    pub calls: Arc<AtomicUsize>,
}

impl StubTts {
    pub fn ok() -> Self {
        Self {
            dir: Some(tempfile::tempdir().unwrap()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            dir: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for StubTts {
    async fn synthesize(&self, _text: &str) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dir = self
            .dir
            .as_ref()
            .ok_or_else(|| Error::Tts("stub synthesizer failure".to_string()))?;

        let path = dir.path().join(format!("tts_{}.wav", Uuid::new_v4()));
        tokio::fs::write(&path, vec![0u8; STUB_AUDIO_SIZE]).await?;
        Ok(path)
    }
}

/// A relay wired to stub engines, plus handles to observe them
pub struct TestRelay {
    pub state: Arc<ApiState>,
    pub audio_dir: tempfile::TempDir,
    pub stt_calls: Arc<AtomicUsize>,
    pub llm_calls: Arc<AtomicUsize>,
    pub tts_calls: Arc<AtomicUsize>,
}

impl TestRelay {
    pub fn with(stt: StubStt, llm: StubLlm, tts: StubTts) -> Self {
        let audio_dir = tempfile::tempdir().unwrap();
        let stt_calls = Arc::clone(&stt.calls);
        let llm_calls = Arc::clone(&llm.calls);
        let tts_calls = Arc::clone(&tts.calls);

        let state = Arc::new(ApiState {
            stt: Arc::new(stt),
            llm: Arc::new(llm),
            tts: Arc::new(tts),
            audio_dir: audio_dir.path().to_path_buf(),
        });

        Self {
            state,
            audio_dir,
            stt_calls,
            llm_calls,
            tts_calls,
        }
    }

    /// A relay where every engine succeeds
    pub fn happy() -> Self {
        Self::with(
            StubStt::ok("hello world\n"),
            StubLlm::ok("Hi there! "),
            StubTts::ok(),
        )
    }

    pub fn router(&self) -> axum::Router {
        voicechat_relay::api::router(Arc::clone(&self.state))
    }
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Build a multipart `POST /voice-chat` request carrying one file field
pub fn upload_request(filename: &str, bytes: &[u8]) -> Request<Body> {
    upload_request_named("file", filename, bytes)
}

/// Same as [`upload_request`] with a caller-chosen field name
pub fn upload_request_named(field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/voice-chat")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Read a JSON response body
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
