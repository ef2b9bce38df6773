//! Streaming chat with history using ChatGPT.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example chat_stream
//! ```

#![allow(clippy::print_stdout)]

use std::io::{Write, stdout};

use tiny_openai::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter("info")
        .init();

    let mut chat = ChatGpt::from_env()?.with_stream(true);
    let options = QueryOptions::new().with_history(6);

    for question in ["Name a prime number.", "Now double it."] {
        println!("> {question}");
        chat.query_with(question, &options, |fragment| {
            print!("{fragment}");
            let _ = stdout().flush();
        })
        .await;
        println!();
    }

    println!(
        "Call Time: {}, Total Tokens: {}.",
        chat.call_count(),
        chat.total_tokens()
    );

    Ok(())
}
