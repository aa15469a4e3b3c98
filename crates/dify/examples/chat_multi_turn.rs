//! # Multi-turn Conversation
//!
//! Two blocking requests; the second continues the conversation opened by
//! the first through its `conversation_id`.
//!
//! ```bash
//! export DIFY_API_KEY=app-…      # mandatory
//! cargo run -p dify --example chat_multi_turn
//! ```
use std::time::Duration;

use dify::client::{DifyClientBuilder, api_v1::ChatMessageRequest};
use dify::report::{ReportBuilder, render_chat_response};
use tracing_subscriber::EnvFilter;

const USER: &str = "test-user";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = DifyClientBuilder::new_from_env().build()?;

    print!("{}", ReportBuilder::new().add_heading("First turn").finalize());
    let first = client
        .chat_message(ChatMessageRequest::new("I want to learn about machine learning.", USER))
        .await?;
    print!("{}", render_chat_response(&first));

    let Some(conversation_id) = first.conversation_id.filter(|id| !id.is_empty()) else {
        anyhow::bail!("first reply carried no conversation id");
    };

    tokio::time::sleep(Duration::from_secs(1)).await;

    print!(
        "\n{}",
        ReportBuilder::new()
            .add_heading("Second turn – same conversation")
            .finalize()
    );
    let second = client
        .chat_message(
            ChatMessageRequest::new("What are its typical applications?", USER)
                .conversation_id(conversation_id),
        )
        .await?;
    print!("{}", render_chat_response(&second));

    Ok(())
}
