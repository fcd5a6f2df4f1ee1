//! Error types for the voicechat relay

use thiserror::Error;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voicechat relay
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Unsupported upload format (client fault)
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Response generation error
    #[error("LLM error: {0}")]
    Generate(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// External engine exceeded its deadline and was killed
    #[error("{stage} timed out after {secs}s")]
    Timeout {
        /// Pipeline stage that timed out
        stage: &'static str,
        /// Configured deadline in seconds
        secs: u64,
    },

    /// Audio device or codec error (console client)
    #[error("audio error: {0}")]
    Audio(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
