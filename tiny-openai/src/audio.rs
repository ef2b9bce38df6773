//! Whisper speech-to-text client.
//!
//! Posts an audio file as multipart form data either to the transcription
//! endpoint (text in the spoken language) or to the translation endpoint
//! (text in English).

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{LlmError, Result};
use crate::transport::{RequestBody, Transport};

/// Which Whisper endpoint to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioTask {
    /// Transcribe in the source language.
    #[default]
    Transcribe,
    /// Transcribe into English.
    Translate,
}

impl AudioTask {
    const fn index(self) -> usize {
        match self {
            Self::Transcribe => 0,
            Self::Translate => 1,
        }
    }
}

/// Numeric mode, clamped: `0` transcribes, anything higher translates.
impl From<usize> for AudioTask {
    fn from(mode: usize) -> Self {
        if mode == 0 {
            Self::Transcribe
        } else {
            Self::Translate
        }
    }
}

/// Same clamping for unsuffixed integer literals; negative modes transcribe.
impl From<i32> for AudioTask {
    fn from(mode: i32) -> Self {
        if mode <= 0 {
            Self::Transcribe
        } else {
            Self::Translate
        }
    }
}

/// Stateful Whisper client counting calls and transcribed characters.
#[derive(Debug)]
pub struct Whisper {
    transport: Transport,
    model: String,
    urls: [String; 2],
    call_count: u64,
    total_chars: u64,
}

impl Whisper {
    /// Default speech-to-text model.
    pub const DEFAULT_MODEL: &'static str = "whisper-1";
    /// Transcription endpoint path.
    pub const TRANSCRIPTIONS_PATH: &'static str = "/audio/transcriptions";
    /// Translation endpoint path.
    pub const TRANSLATIONS_PATH: &'static str = "/audio/translations";

    /// Create a Whisper client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
            model: Self::DEFAULT_MODEL.to_owned(),
            urls: [
                config.endpoint(Self::TRANSCRIPTIONS_PATH),
                config.endpoint(Self::TRANSLATIONS_PATH),
            ],
            call_count: 0,
            total_chars: 0,
        })
    }

    /// Create a client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is unset or the HTTP client
    /// cannot be built.
    pub fn from_env() -> Result<Self> {
        Self::new(&ClientConfig::from_env()?)
    }

    /// Sets the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the transcription and translation endpoint URLs.
    #[must_use]
    pub fn with_urls(mut self, transcribe: impl Into<String>, translate: impl Into<String>) -> Self {
        self.urls = [transcribe.into(), translate.into()];
        self
    }

    /// Get the model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Endpoint URL used for `task`.
    #[must_use]
    pub fn url(&self, task: AudioTask) -> &str {
        &self.urls[task.index()]
    }

    /// Number of successful calls.
    #[must_use]
    pub const fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Total transcript length in characters.
    #[must_use]
    pub const fn total_chars(&self) -> u64 {
        self.total_chars
    }

    /// Transcribe the audio file at `path`.
    ///
    /// Returns `""` on any failure, including a missing file.
    pub async fn transcribe(&mut self, path: impl AsRef<Path>, task: impl Into<AudioTask>) -> String {
        self.try_transcribe(path, task).await.unwrap_or_default()
    }

    /// Like [`transcribe`](Self::transcribe), but reports the failure cause.
    ///
    /// Counters change only when the API returns a non-empty result.
    ///
    /// # Errors
    ///
    /// Returns [`LlmErrorKind::Io`](crate::LlmErrorKind::Io) if the file
    /// cannot be read, or the transport failure.
    pub async fn try_transcribe(
        &mut self,
        path: impl AsRef<Path>,
        task: impl Into<AudioTask>,
    ) -> std::result::Result<String, LlmError> {
        let path = path.as_ref();
        let task = task.into();

        let form = match Self::build_form(&self.model, path).await {
            Ok(form) => form,
            Err(err) => {
                self.transport.report(&err);
                return Err(err);
            }
        };

        let outcome = self
            .transport
            .post(self.url(task), RequestBody::Multipart(form))
            .await;

        let payload = outcome.result?;
        if payload.is_empty() {
            return Ok(String::new());
        }

        let text = payload
            .into_json()
            .as_ref()
            .and_then(|v| v.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        self.total_chars += u64::try_from(text.chars().count()).unwrap_or(u64::MAX);
        self.call_count += 1;

        Ok(text)
    }

    /// Multipart form with the model name and the file contents.
    ///
    /// The file is read fully and closed before the request is sent.
    async fn build_form(model: &str, path: &Path) -> std::result::Result<Form, LlmError> {
        let audio = tokio::fs::read(path)
            .await
            .map_err(|e| LlmError::io(format!("{}: {e}", path.display())))?;

        let file_name = path
            .file_name()
            .map_or_else(|| "audio".to_owned(), |n| n.to_string_lossy().into_owned());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        let file_part = Part::bytes(audio)
            .file_name(file_name)
            .mime_str(mime.essence_str())
            .map_err(|e| LlmError::io(format!("Invalid MIME type: {e}")))?;

        Ok(Form::new()
            .text("model", model.to_owned())
            .part("file", file_part))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn mode_is_clamped() {
        assert_eq!(AudioTask::from(0_usize), AudioTask::Transcribe);
        assert_eq!(AudioTask::from(1_usize), AudioTask::Translate);
        assert_eq!(AudioTask::from(7_usize), AudioTask::Translate);
    }

    #[test]
    fn unsuffixed_mode_is_clamped() {
        fn task(mode: impl Into<AudioTask>) -> AudioTask {
            mode.into()
        }
        assert_eq!(task(0), AudioTask::Transcribe);
        assert_eq!(task(1), AudioTask::Translate);
        assert_eq!(task(3), AudioTask::Translate);
        assert_eq!(task(-1), AudioTask::Transcribe);
    }

    #[test]
    fn default_urls() {
        let whisper = Whisper::new(&ClientConfig::new("sk-test")).unwrap();
        assert_eq!(whisper.model(), Whisper::DEFAULT_MODEL);
        assert_eq!(
            whisper.url(AudioTask::Transcribe),
            "https://api.openai.com/v1/audio/transcriptions"
        );
        assert_eq!(
            whisper.url(AudioTask::Translate),
            "https://api.openai.com/v1/audio/translations"
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let mut whisper = Whisper::new(&ClientConfig::new("sk-test")).unwrap();
        let err = whisper
            .try_transcribe("/definitely/not/here.mp3", AudioTask::Transcribe)
            .await
            .unwrap_err();
        assert_eq!(err.kind, crate::error::LlmErrorKind::Io);
        assert_eq!(whisper.call_count(), 0);
        assert_eq!(whisper.total_chars(), 0);
    }
}
