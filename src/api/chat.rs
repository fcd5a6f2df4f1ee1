//! The voice-chat orchestration endpoint
//!
//! One request runs the pipeline strictly in order: validate upload →
//! recognize → generate reply → synthesize → publish. The first failure
//! aborts the request; there is no partial response.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use uuid::Uuid;

use super::ApiState;
use crate::Error;

/// Upload extensions accepted by the pipeline, lowercase with leading dot
pub const ALLOWED_EXTENSIONS: &[&str] = &[".wav", ".mp3", ".m4a"];

/// Successful pipeline response
#[derive(Debug, Serialize)]
pub struct VoiceChatResponse {
    /// Trimmed transcript of the uploaded clip
    pub transcription: String,

    /// Trimmed assistant reply
    pub response: String,

    /// Relative URL of the published reply audio
    pub audio_url: String,
}

struct Upload {
    filename: String,
    data: axum::body::Bytes,
}

/// Handle `POST /voice-chat`
pub(super) async fn voice_chat(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<Json<VoiceChatResponse>, ChatError> {
    let upload = read_upload(multipart).await?;
    tracing::info!(
        filename = %upload.filename,
        bytes = upload.data.len(),
        "file received"
    );

    let extension = extension_of(&upload.filename)
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or_else(|| Error::UnsupportedFormat("Unsupported file type.".to_string()))?;

    let transcript = state.stt.transcribe(&upload.data, &extension).await?;
    let transcription = transcript.trim().to_string();
    tracing::info!(transcription = %transcription, "transcription result");

    let reply = state.llm.generate(&transcription).await?;
    let response_text = reply.trim().to_string();
    tracing::info!(response = %response_text, "model response");

    let artifact = state.tts.synthesize(&response_text).await?;

    let name = format!("{}.wav", Uuid::new_v4());
    let published = state.audio_dir.join(&name);
    tokio::fs::copy(&artifact, &published)
        .await
        .map_err(|e| ChatError::Internal(format!("failed to publish audio: {e}")))?;

    // The synthesizer's temp output is ours after synthesis; drop it
    if let Err(e) = tokio::fs::remove_file(&artifact).await {
        tracing::debug!(
            path = %artifact.display(),
            error = %e,
            "could not remove synthesizer temp file"
        );
    }

    Ok(Json(VoiceChatResponse {
        transcription,
        response: response_text,
        audio_url: format!("/audio/{name}"),
    }))
}

/// Pull the `file` field out of the multipart body
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ChatError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ChatError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ChatError::BadRequest("file field has no filename".to_string()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ChatError::BadRequest(format!("failed to read upload: {e}")))?;

        return Ok(Upload { filename, data });
    }

    Err(ChatError::BadRequest("missing file field".to_string()))
}

/// Extract the lowercased extension (with leading dot) from a filename
fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Voice-chat endpoint errors
#[derive(Debug)]
pub enum ChatError {
    /// Client fault: bad upload
    BadRequest(String),

    /// An adapter signalled failure
    Pipeline(Error),

    /// Anything else caught at the endpoint boundary
    Internal(String),
}

impl From<Error> for ChatError {
    fn from(e: Error) -> Self {
        match e {
            Error::UnsupportedFormat(detail) => Self::BadRequest(detail),
            other => Self::Pipeline(other),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            detail: String,
        }

        let (status, detail) = match self {
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::Pipeline(e) => {
                tracing::error!(error = %e, "pipeline step failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            Self::Internal(detail) => {
                tracing::error!(detail = %detail, "voice-chat request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Server error: {detail}"),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
