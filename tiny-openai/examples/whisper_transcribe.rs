//! Speech-to-text using Whisper.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example whisper_transcribe -- speech.mp3
//! ```

#![allow(clippy::print_stdout)]

use tiny_openai::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .ok_or_else(|| Error::config("usage: whisper_transcribe <audio file>"))?;

    let mut whisper = Whisper::from_env()?;

    let text = whisper.try_transcribe(&path, AudioTask::Transcribe).await?;
    println!("Transcript: {text}");

    let english = whisper.transcribe(&path, AudioTask::Translate).await;
    println!("English: {english}");

    println!("Calls: {}, Characters: {}", whisper.call_count(), whisper.total_chars());

    Ok(())
}
