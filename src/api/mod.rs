//! HTTP API server for the voicechat relay

pub mod chat;
pub mod maintenance;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::engine::{ResponseGenerator, SpeechSynthesizer, SpeechToText};

/// Maximum accepted upload size
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared state for API handlers
pub struct ApiState {
    /// Speech recognizer
    pub stt: Arc<dyn SpeechToText>,

    /// Reply generator
    pub llm: Arc<dyn ResponseGenerator>,

    /// Speech synthesizer
    pub tts: Arc<dyn SpeechSynthesizer>,

    /// Web-servable directory for published artifacts
    pub audio_dir: PathBuf,
}

/// Build the router with all routes
///
/// Published artifacts are served statically under `/audio`.
pub fn router(state: Arc<ApiState>) -> Router {
    let audio_dir = state.audio_dir.clone();

    // CORS is wide open so a browser frontend can talk to the relay directly
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/voice-chat", post(chat::voice_chat))
        .route("/cleanup", get(maintenance::cleanup))
        .nest_service("/audio", ServeDir::new(audio_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Liveness/info message
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Voicechat relay is running. Use /voice-chat endpoint to interact."
    }))
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server from shared state and a port
    #[must_use]
    pub const fn new(state: Arc<ApiState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the audio directory cannot be created or the server
    /// fails to bind or run
    pub async fn run(self) -> Result<()> {
        std::fs::create_dir_all(&self.state.audio_dir)?;

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(
            port = self.port,
            audio_dir = %self.state.audio_dir.display(),
            "API server listening"
        );

        axum::serve(listener, router(self.state))
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
