mod chat_messages;
mod common;
mod retrieve;

pub use chat_messages::*;
pub use retrieve::*;
