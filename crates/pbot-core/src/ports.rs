use async_trait::async_trait;

use crate::errors::GenerationError;

/// Hexagonal port for the remote text-generation service.
///
/// Each call is independent: the implementation sends the persona system message
/// and `prompt` as the only turns, so nothing is remembered between calls.
#[async_trait]
pub trait GenerationPort: Send + Sync {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}
