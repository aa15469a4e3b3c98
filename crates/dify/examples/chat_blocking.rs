//! # Blocking Chat Message
//!
//! Sends one question in *blocking* mode and prints the full report: ids,
//! answer, token usage and the knowledge-base resources the answer cites.
//!
//! ```bash
//! export DIFY_API_KEY=app-…      # mandatory
//! cargo run -p dify --example chat_blocking -- "Introduce yourself briefly"
//! ```
use std::time::Instant;

use dify::client::{DifyClientBuilder, api_v1::ChatMessageRequest};
use dify::report::{ReportBuilder, render_chat_response};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Hello, please introduce yourself briefly.".to_owned());

    let client = DifyClientBuilder::new_from_env().build()?;

    print!(
        "{}",
        ReportBuilder::new()
            .add_banner("Chat message – blocking mode")
            .add_key_value("API base URL", client.base_url())
            .add_key_value("Query", &query)
            .add_rule()
            .finalize()
    );

    let started = Instant::now();
    let response = client
        .chat_message(ChatMessageRequest::new(query, "test-user"))
        .await?;

    println!("Request succeeded in {:.2}s\n", started.elapsed().as_secs_f64());
    print!("{}", render_chat_response(&response));
    Ok(())
}
