//! External engine adapters
//!
//! The recognizer, language model, and synthesizer are opaque collaborators.
//! Each is reached through a narrow trait so the orchestration pipeline can
//! run against test doubles without real model binaries.

mod llm;
mod stt;
mod tts;

pub use llm::ChatCompletions;
pub use stt::WhisperCli;
pub use tts::CoquiCli;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::Result;

/// Recognizes speech in an uploaded audio clip
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe raw audio bytes to text
    ///
    /// `extension` is the clip's file suffix including the leading dot
    /// (e.g. `".wav"`); the caller has already validated it. The transcript
    /// is returned verbatim, trailing whitespace included.
    async fn transcribe(&self, audio: &[u8], extension: &str) -> Result<String>;
}

/// Generates an assistant reply for a user utterance
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce a reply for the given (trimmed, non-empty) text
    async fn generate(&self, text: &str) -> Result<String>;
}

/// Synthesizes speech for a reply
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` to a WAV file and return its path
    ///
    /// Ownership of the file passes to the caller, which must relocate or
    /// delete it.
    async fn synthesize(&self, text: &str) -> Result<PathBuf>;
}
