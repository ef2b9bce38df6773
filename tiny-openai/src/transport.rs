//! The single HTTP POST routine shared by all clients.
//!
//! [`Transport::post`] never fails outright: it returns a [`CallOutcome`]
//! holding either the decoded [`Payload`] or the classified [`LlmError`],
//! together with the streaming flag derived from the request body.

use std::fmt;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Proxy, RequestBuilder, StatusCode};
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::error::{LlmError, LlmErrorKind, Result};
use crate::stream::{FragmentStream, fragment_stream};

/// Body of a POST request.
#[derive(Debug)]
pub enum RequestBody {
    /// JSON body, sent with `Content-Type: application/json`.
    Json(Value),
    /// Multipart form body (file uploads).
    Multipart(Form),
}

impl RequestBody {
    /// Whether the body asks for a streamed response (`"stream": true`).
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        match self {
            Self::Json(value) => value.get("stream").and_then(Value::as_bool) == Some(true),
            Self::Multipart(_) => false,
        }
    }
}

/// Successful response body.
pub enum Payload {
    /// Decoded JSON body.
    Json(Value),
    /// Lazy fragment sequence of a streaming chat response.
    Stream(FragmentStream),
}

impl Payload {
    /// The empty value failures collapse to.
    #[must_use]
    pub fn empty() -> Self {
        Self::Json(Value::Object(Map::new()))
    }

    /// Whether this payload carries nothing (null or an empty JSON value).
    ///
    /// A stream is never considered empty before it is consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Json(value) => is_empty_json(value),
            Self::Stream(_) => false,
        }
    }

    /// The JSON body, if this is not a stream.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Stream(_) => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Result of one POST, tagged with the streaming flag that was used.
#[derive(Debug)]
pub struct CallOutcome {
    /// Whether the request asked for a streamed response.
    pub streaming: bool,
    /// Decoded payload or classified failure.
    pub result: std::result::Result<Payload, LlmError>,
}

impl CallOutcome {
    /// Collapse a failure to [`Payload::empty`].
    #[must_use]
    pub fn into_payload(self) -> Payload {
        self.result.unwrap_or_else(|_| Payload::empty())
    }

    /// Failure kind, if the call failed.
    #[must_use]
    pub fn error_kind(&self) -> Option<LlmErrorKind> {
        self.result.as_ref().err().map(|e| e.kind)
    }
}

/// Authenticated HTTP transport with an optional proxy.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    api_key: String,
    debug: bool,
}

impl Transport {
    /// Build a transport from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`](crate::Error::Http) if the proxy URL is
    /// malformed or the HTTP client cannot be created.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key.clone(),
            debug: config.debug,
        })
    }

    /// Whether debug hints are enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Issue one POST to `url` and classify the response.
    ///
    /// Only HTTP 200 counts as success. No retry is attempted.
    pub async fn post(&self, url: &str, body: RequestBody) -> CallOutcome {
        let streaming = body.is_streaming();
        tracing::debug!(url, streaming, "POST");

        let request = match body {
            RequestBody::Json(value) => self
                .request(url)
                .header(CONTENT_TYPE, "application/json")
                .json(&value),
            RequestBody::Multipart(form) => self.request(url).multipart(form),
        };

        let result = Self::send(request, streaming).await;
        if let Err(err) = &result {
            self.report(err);
        }

        CallOutcome { streaming, result }
    }

    /// Log a failure, at `warn` with its hint when debug is on.
    pub(crate) fn report(&self, err: &LlmError) {
        if self.debug && err.kind != LlmErrorKind::ResponseFormat {
            tracing::warn!(kind = ?err.kind, error = %err, "@ {}", err.hint());
        } else {
            tracing::debug!(kind = ?err.kind, error = %err, "request failed");
        }
    }

    fn request(&self, url: &str) -> RequestBuilder {
        self.client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn send(
        request: RequestBuilder,
        streaming: bool,
    ) -> std::result::Result<Payload, LlmError> {
        let response = request.send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::http_status(status.as_u16(), error_text));
        }

        if streaming {
            return Ok(Payload::Stream(fragment_stream(response.bytes_stream())));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text)
            .map(Payload::Json)
            .map_err(|e| {
                LlmError::response_format(
                    "JSON body",
                    format!("parse error: {e}, response: {response_text}"),
                )
            })
    }
}

/// Reported `usage.total_tokens`, or 0 when absent.
pub(crate) fn usage_total_tokens(value: &Value) -> u64 {
    value
        .pointer("/usage/total_tokens")
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
