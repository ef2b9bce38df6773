//! Client configuration shared by all three clients.

use crate::error::{Error, Result};

/// Credentials and transport settings for the OpenAI clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Base URL for the API (defaults to OpenAI's API).
    pub base_url: String,
    /// Optional HTTP/HTTPS proxy URL.
    pub proxy: Option<String>,
    /// Emit categorized failure hints at `warn` level.
    pub debug: bool,
}

impl ClientConfig {
    /// Default OpenAI API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Creates a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Reads from:
    /// - `OPENAI_API_KEY` - Required API key
    /// - `OPENAI_BASE_URL` - Optional base URL
    /// - `OPENAI_PROXY` - Optional proxy URL
    /// - `OPENAI_DEBUG` - `1` or `true` enables debug hints
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `OPENAI_API_KEY` is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::config("OPENAI_API_KEY environment variable not set"))?;

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_owned());

        let proxy = std::env::var("OPENAI_PROXY").ok();

        let debug = std::env::var("OPENAI_DEBUG")
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

        Ok(Self {
            api_key,
            base_url,
            proxy,
            debug,
        }
        .normalized())
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the proxy. An empty string clears it.
    #[must_use]
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self.normalized()
    }

    /// Enables or disables debug hints.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Joins an endpoint path onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    fn normalized(mut self) -> Self {
        if self.proxy.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.proxy = None;
        }
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            proxy: None,
            debug: false,
        }
    }
}
