//! # Streaming Chat Message
//!
//! Sends one question in *streaming* mode. Answer chunks are printed as they
//! arrive, workflow and node lifecycle events as progress lines, and a
//! summary with ids and usage once the stream is folded.
//!
//! ```bash
//! export DIFY_API_KEY=app-…      # mandatory
//! RUST_LOG=dify_core=debug cargo run -p dify --features tracing --example chat_stream
//! ```
use std::io::{self, Write};
use std::time::Instant;

use dify::StreamEvent;
use dify::client::{DifyClientBuilder, api_v1::ChatMessageRequest};
use dify::report::{describe_event, render_stream_summary};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Describe artificial intelligence in three sentences.".to_owned());

    let client = DifyClientBuilder::new_from_env().build()?;

    println!("Sending: {query}");
    println!("{}", "-".repeat(60));
    println!("[Answer]");

    let started = Instant::now();
    let acc = client
        .chat_message_collect(ChatMessageRequest::new(query, "test-user"), |event| {
            match event {
                StreamEvent::Message { answer, .. } => print!("{answer}"),
                StreamEvent::MessageEnd { .. } => println!("\n"),
                other => {
                    if let Some(line) = describe_event(other) {
                        println!("\n{line}");
                    }
                }
            }
            io::stdout().flush().ok();
        })
        .await?;

    print!("{}", render_stream_summary(&acc, started.elapsed()));

    if acc.is_failed() {
        anyhow::bail!("stream ended with a server error");
    }
    Ok(())
}
