//! One-off query and translation using ChatGPT.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example chat_translate
//! ```

#![allow(clippy::print_stdout)]

use tiny_openai::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let mut chat = ChatGpt::from_env()?;

    let answer = chat
        .try_query("Write a haiku about Rust.", &QueryOptions::default())
        .await?;
    println!("{answer}\n");

    let translated = chat.translate(&answer, DEFAULT_TRANSLATE_LANGUAGE).await;
    println!("{translated}");

    Ok(())
}
