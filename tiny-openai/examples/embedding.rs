//! Text embeddings.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example embedding
//! ```

#![allow(clippy::print_stdout)]

use tiny_openai::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let mut embedder = Embedder::from_env()?;

    let texts: &[&str] = &["The cat sat on the mat.", "A feline rested on the rug."];
    let data = embedder.try_embed(texts).await?;

    for record in &data {
        println!("#{}: {} dimensions", record.index, record.embedding.len());
    }
    println!("Tokens used: {}", embedder.total_tokens());

    Ok(())
}
