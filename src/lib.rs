//! Voicechat relay - speech-to-text, LLM reply, text-to-speech over HTTP
//!
//! The relay accepts a short audio clip, transcribes it with an external
//! recognizer binary, asks a language model for a reply, synthesizes the
//! reply with an external synthesizer binary, and returns the audio plus
//! both transcripts.
//!
//! # Architecture
//!
//! ```text
//! console client ──POST /voice-chat──▶ ┌──────────────────────────┐
//!                                      │       api (axum)         │
//!                                      │  validate → orchestrate  │
//!                                      └─────┬──────┬──────┬──────┘
//!                                            │      │      │
//!                                      recognizer  LLM  synthesizer
//!                                      (subprocess) (HTTP) (subprocess)
//! ```
//!
//! Published reply audio is served statically under `/audio` and swept by
//! `GET /cleanup`.

pub mod api;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
