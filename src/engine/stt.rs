//! Speech-to-text via the whisper.cpp CLI

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use uuid::Uuid;

use super::SpeechToText;
use crate::config::SttConfig;
use crate::{Error, Result};

/// Recognizer adapter backed by a whisper.cpp style command
///
/// Each call writes the clip into a scoped temp directory, runs the binary
/// against it, and reads back the sibling `.txt` transcript the binary
/// produces. The temp directory is removed on every exit path.
pub struct WhisperCli {
    config: SttConfig,
}

impl WhisperCli {
    /// Create a recognizer adapter from configuration
    #[must_use]
    pub const fn new(config: SttConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SpeechToText for WhisperCli {
    async fn transcribe(&self, audio: &[u8], extension: &str) -> Result<String> {
        let dir = tempfile::tempdir()?;
        let audio_path = dir.path().join(format!("{}{extension}", Uuid::new_v4()));
        let out_prefix = dir.path().join("transcription");
        let transcript_path = dir.path().join("transcription.txt");

        tokio::fs::write(&audio_path, audio).await?;

        tracing::debug!(
            binary = %self.config.binary.display(),
            audio_bytes = audio.len(),
            "starting recognition"
        );

        let mut command = Command::new(&self.config.binary);
        command
            .arg("-m")
            .arg(&self.config.model)
            .arg("-f")
            .arg(&audio_path)
            .arg("-otxt")
            .arg("-of")
            .arg(&out_prefix)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.config.timeout(), command.output())
            .await
            .map_err(|_| Error::Timeout {
                stage: "recognizer",
                secs: self.config.timeout_secs,
            })?
            .map_err(|e| Error::Stt(format!("failed to run recognizer: {e}")))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Stt(format!(
                "recognizer exited with code {code}: {}",
                stderr.trim()
            )));
        }

        match tokio::fs::read_to_string(&transcript_path).await {
            Ok(text) => {
                tracing::info!(transcript = %text.trim(), "recognition complete");
                Ok(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::Stt(
                "recognizer produced no transcript file".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}
