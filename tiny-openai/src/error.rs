//! Error types for the tiny OpenAI clients.
//!
//! Client operations never propagate failures: the plain operations collapse
//! every failure to an empty value. [`LlmError`] is the tagged form behind
//! that, exposed by the `try_*` operations and by
//! [`CallOutcome`](crate::transport::CallOutcome), so callers and tests can
//! tell failure causes apart.
//!
//! [`Error`] is reserved for the few fallible constructors (building the HTTP
//! client, reading configuration from the environment).

use std::fmt;

/// Result type alias for fallible constructors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error returned by client constructors and configuration loading.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// API call failure.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// HTTP client could not be built (e.g. malformed proxy URL).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or invalid configuration.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Failure of a single API call.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// Additional error message.
    pub message: String,
    /// HTTP status code, for status failures.
    pub status: Option<u16>,
}

/// Categories of API call failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// TLS handshake or certificate failure.
    Tls,
    /// Connection or other transport failure.
    Network,
    /// HTTP 400, usually an unsupported upload.
    BadRequest,
    /// HTTP 401, usually a bad API key.
    Auth,
    /// HTTP 404, usually a bad endpoint URL.
    NotFound,
    /// Any other non-200 status.
    HttpStatus,
    /// Response body could not be decoded.
    ResponseFormat,
    /// Failure while reading a streamed body.
    Stream,
    /// Local file could not be read.
    Io,
}

impl LlmError {
    fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Tls, message)
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    /// Classify a non-200 HTTP status.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let kind = match status {
            400 => LlmErrorKind::BadRequest,
            401 => LlmErrorKind::Auth,
            404 => LlmErrorKind::NotFound,
            _ => LlmErrorKind::HttpStatus,
        };
        Self {
            kind,
            message: format!("HTTP {status}: {}", body.into()),
            status: Some(status),
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::new(
            LlmErrorKind::ResponseFormat,
            format!("Expected {}, got {}", expected.into(), got.into()),
        )
    }

    /// Create a streaming error.
    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Stream, message)
    }

    /// Create a local I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Io, message)
    }

    /// Short operator hint for this failure, as printed in debug mode.
    #[must_use]
    pub fn hint(&self) -> String {
        match self.kind {
            LlmErrorKind::Tls => {
                "SSL error, please update the system certificate store".to_owned()
            }
            LlmErrorKind::Network | LlmErrorKind::Stream => "Network error!".to_owned(),
            LlmErrorKind::BadRequest => {
                "Error, please check file type (mp3/m4a/wav/... audio file)!".to_owned()
            }
            LlmErrorKind::Auth => "Error, please check API key!".to_owned(),
            LlmErrorKind::NotFound => "Error, please check API URL!".to_owned(),
            LlmErrorKind::HttpStatus => format!(
                "Error, HTTP status code is: {}!",
                self.status.unwrap_or_default()
            ),
            LlmErrorKind::ResponseFormat => "Error, response could not be decoded!".to_owned(),
            LlmErrorKind::Io => "Error, file not found!".to_owned(),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if is_tls_failure(&err) {
            Self::tls(format!("TLS failure: {err}"))
        } else if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<std::io::Error> for LlmError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// reqwest has no TLS predicate, so walk the source chain for one.
///
/// The top-level message embeds the request URL and is skipped.
fn is_tls_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = err.source();
    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        current = e.source();
    }
    false
}
