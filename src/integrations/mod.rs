//! External API integrations

use async_trait::async_trait;

use crate::error::Result;

pub mod openai;

pub use openai::OpenAIClient;

/// Capability interface for remote text generation, so tests can substitute
/// deterministic fakes for the real endpoint.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for the given system/user prompts.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        model: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String>;
}
