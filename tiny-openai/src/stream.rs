//! Streamed chat delta decoding.
//!
//! A streaming chat response is a sequence of lines, each carrying a
//! 5-character marker (`data:`) followed by a JSON chunk, and terminated by a
//! `[DONE]` sentinel. [`fragment_stream`] turns the raw response body into a
//! lazy, single-pass stream of answer fragments.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::error::LlmError;

/// Length of the line marker preceding each JSON chunk.
const MARKER_LEN: usize = 5;

/// End-of-stream sentinel payload.
const DONE: &str = "[DONE]";

/// Lazy sequence of answer fragments from a streaming chat response.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Decode one response line into a fragment.
///
/// Blank lines, comments, bare markers and the `[DONE]` sentinel yield
/// `None`. A chunk without `choices[0].delta.content` yields an empty
/// fragment.
#[must_use]
pub fn parse_delta(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();

    if text.is_empty() || text.starts_with(':') {
        return None;
    }

    let (offset, _) = text.char_indices().nth(MARKER_LEN)?;
    let data = text[offset..].trim();
    if data.is_empty() || data == DONE {
        return None;
    }

    match serde_json::from_str::<Value>(data) {
        Ok(chunk) => Some(
            chunk
                .pointer("/choices/0/delta/content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        ),
        Err(e) => {
            tracing::warn!("Failed to parse stream chunk: {e}, data: {data}");
            None
        }
    }
}

/// Wrap a response byte stream into a [`FragmentStream`].
///
/// Lines are reassembled across chunk boundaries. A read error is yielded
/// once and ends the stream.
pub fn fragment_stream<S, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let mut body = Box::pin(body);

    Box::pin(async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        // Bytes of `buffer` already known to hold no newline.
        let mut scanned = 0;

        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(bytes) => {
                    buffer.extend_from_slice(&bytes);
                    while let Some(rel) = buffer[scanned..].iter().position(|&b| b == b'\n') {
                        let line: Vec<u8> = buffer.drain(..=scanned + rel).collect();
                        scanned = 0;
                        if let Some(fragment) = parse_delta(&line) {
                            yield Ok(fragment);
                        }
                    }
                    scanned = buffer.len();
                }
                Err(e) => {
                    buffer.clear();
                    yield Err(LlmError::stream(e.to_string()));
                    break;
                }
            }
        }

        if let Some(fragment) = parse_delta(&buffer) {
            yield Ok(fragment);
        }
    })
}
