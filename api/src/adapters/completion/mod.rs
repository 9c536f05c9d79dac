//! Completion adapters

pub mod openai;

pub use openai::{NoopCompletionClient, OpenAiCompletionClient};
