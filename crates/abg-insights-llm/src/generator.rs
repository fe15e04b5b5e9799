//! Text generation seam between prompts and a language-model provider.
//!
//! Provider transports live outside this crate; they implement
//! [`TextGenerator`]. [`MockGenerator`] stands in for one in tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;

/// Generation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("No response generated")]
    EmptyResponse,

    #[error("Generator unavailable: {0}")]
    Unavailable(String),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Produces a free-text reply for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        (**self).generate(prompt).await
    }
}

/// Scripted generator for testing without a provider.
///
/// Replies are served in the order they were queued. Once the queue is
/// drained every call fails with [`GenerationError::Unavailable`].
#[derive(Default)]
pub struct MockGenerator {
    replies: Mutex<VecDeque<GenerationResult<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator with a single queued reply.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        let generator = Self::new();
        generator.push_reply(reply);
        generator
    }

    /// Generator whose first call fails.
    pub fn with_failure(error: GenerationError) -> Self {
        let generator = Self::new();
        generator.push_failure(error);
        generator
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        self.lock_replies().push_back(Ok(reply.into()));
    }

    pub fn push_failure(&self, error: GenerationError) {
        self.lock_replies().push_back(Err(error));
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<GenerationResult<String>>> {
        self.replies
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(prompt.to_string());

        self.lock_replies()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Unavailable("no scripted reply".into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_in_order() {
        let generator = MockGenerator::with_reply("first");
        generator.push_failure(GenerationError::Provider("quota exceeded".into()));

        assert_eq!(generator.generate("a").await, Ok("first".to_string()));
        assert_eq!(
            generator.generate("b").await,
            Err(GenerationError::Provider("quota exceeded".into()))
        );
        assert!(matches!(
            generator.generate("c").await,
            Err(GenerationError::Unavailable(_))
        ));
        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GenerationError::Provider("timeout".into()).to_string(),
            "Provider error: timeout"
        );
        assert_eq!(GenerationError::EmptyResponse.to_string(), "No response generated");
    }
}
