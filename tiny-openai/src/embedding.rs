//! Text embedding client.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::error::{LlmError, Result};
use crate::transport::{RequestBody, Transport, usage_total_tokens};

/// Text to embed: one string or an ordered batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    /// A single string.
    Single(String),
    /// Several strings, embedded in order.
    Batch(Vec<String>),
}

impl From<&str> for EmbeddingInput {
    fn from(text: &str) -> Self {
        Self::Single(text.to_owned())
    }
}

impl From<String> for EmbeddingInput {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for EmbeddingInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Batch(texts)
    }
}

impl From<&[&str]> for EmbeddingInput {
    fn from(texts: &[&str]) -> Self {
        Self::Batch(texts.iter().map(|&t| t.to_owned()).collect())
    }
}

/// One embedding record of the response `data` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingData {
    /// Position of the input this vector belongs to.
    #[serde(default)]
    pub index: usize,
    /// The embedding vector.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// Stateful embedding client counting calls and tokens.
#[derive(Debug)]
pub struct Embedder {
    transport: Transport,
    model: String,
    url: String,
    call_count: u64,
    total_tokens: u64,
}

impl Embedder {
    /// Default embedding model.
    pub const DEFAULT_MODEL: &'static str = "text-embedding-ada-002";
    /// Endpoint path relative to the base URL.
    pub const PATH: &'static str = "/embeddings";

    /// Create an embedding client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
            model: Self::DEFAULT_MODEL.to_owned(),
            url: config.endpoint(Self::PATH),
            call_count: 0,
            total_tokens: 0,
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

    /// Sets the full endpoint URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Get the model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of successful calls.
    #[must_use]
    pub const fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Running token total from reported usage.
    #[must_use]
    pub const fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Embed `input`, returning one record per input string.
    ///
    /// Returns an empty vector on failure.
    pub async fn embed(&mut self, input: impl Into<EmbeddingInput>) -> Vec<EmbeddingData> {
        self.try_embed(input).await.unwrap_or_default()
    }

    /// Like [`embed`](Self::embed), but reports the failure cause.
    ///
    /// # Errors
    ///
    /// Returns the transport failure, or
    /// [`LlmErrorKind::ResponseFormat`](crate::LlmErrorKind::ResponseFormat)
    /// if `data` is not a list of embedding records. Counters only move on
    /// success.
    pub async fn try_embed(
        &mut self,
        input: impl Into<EmbeddingInput>,
    ) -> std::result::Result<Vec<EmbeddingData>, LlmError> {
        let input: EmbeddingInput = input.into();
        let body = json!({
            "model": self.model,
            "input": input,
        });

        let payload = self
            .transport
            .post(&self.url, RequestBody::Json(body))
            .await
            .result?;
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        let Some(mut value) = payload.into_json() else {
            return Ok(Vec::new());
        };

        let data = match value.get_mut("data").map(Value::take) {
            None => Vec::new(),
            Some(data) => serde_json::from_value(data).map_err(|e| {
                let err = LlmError::response_format("embedding data list", e.to_string());
                self.transport.report(&err);
                err
            })?,
        };

        self.total_tokens += usage_total_tokens(&value);
        self.call_count += 1;
        Ok(data)
    }
}
