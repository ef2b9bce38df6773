//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tiny_openai::prelude::*;
//! ```

pub use crate::audio::{AudioTask, Whisper};
pub use crate::chat::{ChatGpt, DEFAULT_SYSTEM_PROMPT, DEFAULT_TRANSLATE_LANGUAGE, QueryOptions};
pub use crate::config::ClientConfig;
pub use crate::embedding::{Embedder, EmbeddingData, EmbeddingInput};
pub use crate::error::{Error, LlmError, LlmErrorKind, Result};
pub use crate::message::{ChatMessage, Role};
pub use crate::stream::FragmentStream;
pub use crate::transport::{CallOutcome, Payload};
