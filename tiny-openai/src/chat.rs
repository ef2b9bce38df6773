//! ChatGPT chat completion client.

use futures::StreamExt;
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::error::{LlmError, Result};
use crate::message::{ChatMessage, tail_exchanges};
use crate::stream::FragmentStream;
use crate::transport::{CallOutcome, Payload, RequestBody, Transport, usage_total_tokens};

/// System prompt used by [`QueryOptions::default`].
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Target language used by [`ChatGpt::translate`] callers that have no preference.
pub const DEFAULT_TRANSLATE_LANGUAGE: &str = "simplified chinese";

/// How [`ChatGpt::query`] assembles its message list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Include stored history between the system and user messages.
    pub use_history: bool,
    /// Number of trailing exchanges to include; `0` means all.
    pub history_depth: i64,
    /// System prompt content.
    pub system: String,
}

impl QueryOptions {
    /// Options without history and with the default system prompt.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the last `depth` exchanges of history (`0` for all).
    #[must_use]
    pub const fn with_history(mut self, depth: i64) -> Self {
        self.use_history = true;
        self.history_depth = depth;
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            use_history: false,
            history_depth: 0,
            system: DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }
}

/// Stateful chat client keeping counters and conversation history.
#[derive(Debug)]
pub struct ChatGpt {
    transport: Transport,
    model: String,
    url: String,
    stream: bool,
    call_count: u64,
    total_tokens: u64,
    history: Vec<ChatMessage>,
}

impl ChatGpt {
    /// Default chat model.
    pub const DEFAULT_MODEL: &'static str = "gpt-3.5-turbo";
    /// Endpoint path relative to the base URL.
    pub const PATH: &'static str = "/chat/completions";

    /// Create a chat client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
            model: Self::DEFAULT_MODEL.to_owned(),
            url: config.endpoint(Self::PATH),
            stream: false,
            call_count: 0,
            total_tokens: 0,
            history: Vec::new(),
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

    /// Request streamed responses by default.
    #[must_use]
    pub const fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
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

    /// Whether responses are streamed.
    #[must_use]
    pub const fn stream_enabled(&self) -> bool {
        self.stream
    }

    /// Number of calls made.
    #[must_use]
    pub const fn call_count(&self) -> u64 {
        self.call_count
    }

    /// Running token total.
    ///
    /// Streamed answers add one per fragment, an estimate since usage is
    /// not reported mid-stream.
    #[must_use]
    pub const fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    /// Conversation history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Empties the conversation history. Counters are kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Send `messages` as one chat completion request.
    ///
    /// Always counts the call; adds reported usage for non-streamed results.
    pub async fn call(&mut self, messages: &[ChatMessage]) -> CallOutcome {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": self.stream,
        });

        let outcome = self.transport.post(&self.url, RequestBody::Json(body)).await;

        self.call_count += 1;
        if let Ok(Payload::Json(value)) = &outcome.result {
            self.total_tokens += usage_total_tokens(value);
        }

        outcome
    }

    /// Assistant text of a non-streamed result, or `""` if absent.
    #[must_use]
    pub fn extract_text(result: &Value) -> String {
        result
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }

    /// Ask `text` and record the exchange in history.
    ///
    /// Returns `""` when the call fails.
    pub async fn query(&mut self, text: &str, options: &QueryOptions) -> String {
        self.query_with(text, options, |_| {}).await
    }

    /// Like [`query`](Self::query), passing each streamed fragment to
    /// `on_fragment` as it arrives.
    pub async fn query_with(
        &mut self,
        text: &str,
        options: &QueryOptions,
        on_fragment: impl FnMut(&str),
    ) -> String {
        self.exchange(text, options, on_fragment).await.0
    }

    /// Like [`query`](Self::query), but reports the failure cause.
    ///
    /// History is updated either way.
    ///
    /// # Errors
    ///
    /// Returns the transport failure, or the read error that cut a stream
    /// short.
    pub async fn try_query(
        &mut self,
        text: &str,
        options: &QueryOptions,
    ) -> std::result::Result<String, LlmError> {
        match self.exchange(text, options, |_| {}).await {
            (_, Some(err)) => Err(err),
            (answer, None) => Ok(answer),
        }
    }

    /// Translate `text` into `lang` with a one-off query.
    ///
    /// Blank input returns `""` without calling the API.
    pub async fn translate(&mut self, text: &str, lang: &str) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }

        let prompt = format!(
            "Please help me to translate,`{text}` to {lang}, please return only translated content not include the origin text"
        );
        self.query(&prompt, &QueryOptions::new().with_system(""))
            .await
    }

    /// Message list for a query: system, optional history tail, user.
    pub(crate) fn build_messages(&self, text: &str, options: &QueryOptions) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(options.system.clone())];
        if options.use_history {
            messages.extend_from_slice(tail_exchanges(&self.history, options.history_depth));
        }
        messages.push(ChatMessage::user(text));
        messages
    }

    async fn exchange(
        &mut self,
        text: &str,
        options: &QueryOptions,
        on_fragment: impl FnMut(&str),
    ) -> (String, Option<LlmError>) {
        let messages = self.build_messages(text, options);
        let result = self.call(&messages).await.result;
        self.record_exchange(text, result, on_fragment).await
    }

    /// Drain `result` into an answer and append the exchange to history.
    async fn record_exchange(
        &mut self,
        text: &str,
        result: std::result::Result<Payload, LlmError>,
        on_fragment: impl FnMut(&str),
    ) -> (String, Option<LlmError>) {
        let (answer, failure) = match result {
            Ok(Payload::Json(value)) => (Self::extract_text(&value), None),
            Ok(Payload::Stream(fragments)) => self.collect(fragments, on_fragment).await,
            Err(err) => (String::new(), Some(err)),
        };

        self.history.push(ChatMessage::user(text));
        self.history.push(ChatMessage::assistant(answer.clone()));

        (answer, failure)
    }

    async fn collect(
        &mut self,
        mut fragments: FragmentStream,
        mut on_fragment: impl FnMut(&str),
    ) -> (String, Option<LlmError>) {
        let mut answer = String::new();

        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    on_fragment(&fragment);
                    answer.push_str(&fragment);
                    self.total_tokens += 1;
                }
                Err(err) => {
                    self.transport.report(&err);
                    return (answer, Some(err));
                }
            }
        }

        (answer, None)
    }
}
