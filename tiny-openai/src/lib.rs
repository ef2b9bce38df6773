//! Tiny OpenAI - small stateful clients for the ChatGPT, Whisper and
//! Embedding APIs.
//!
//! Each client assembles a request payload, issues one POST through the
//! shared [`Transport`](transport::Transport), and unwraps the JSON or
//! streamed response while keeping call and token counters.
//!
//! Plain operations never fail: errors are logged through `tracing` and
//! collapse to an empty value. The `try_*` variants return the classified
//! [`LlmError`] instead.

pub mod audio;
pub mod chat;
pub mod config;
pub mod embedding;
pub mod error;
pub mod message;
pub mod prelude;
pub mod stream;
pub mod transport;

pub use audio::{AudioTask, Whisper};
pub use chat::{ChatGpt, QueryOptions};
pub use config::ClientConfig;
pub use embedding::{Embedder, EmbeddingData, EmbeddingInput};
pub use error::{Error, LlmError, LlmErrorKind, Result};
