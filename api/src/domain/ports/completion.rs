//! Generative completion port trait
//!
//! Used to write short product recommendation texts.

use async_trait::async_trait;

use crate::error::CompletionError;

/// Port trait for text completion
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Complete `prompt` under the given system instruction
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError>;
}
