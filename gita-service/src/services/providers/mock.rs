//! Mock provider implementation for testing.

use super::{FinishReason, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;

/// What the mock should do on each call.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return the given text.
    Reply(String),
    /// Succeed but with no extractable text.
    Empty,
    /// Fail with a provider error.
    Fail(String),
}

/// Mock text provider for testing the relay's dispatch paths.
pub struct MockTextProvider {
    behavior: MockBehavior,
}

impl MockTextProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self { behavior }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(MockBehavior::Reply(text.to_string()))
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(&self, _prompt: &str) -> Result<ProviderResponse, ProviderError> {
        match &self.behavior {
            MockBehavior::Reply(text) => Ok(ProviderResponse {
                text: Some(text.clone()),
                finish_reason: FinishReason::Complete,
            }),
            MockBehavior::Empty => Ok(ProviderResponse {
                text: None,
                finish_reason: FinishReason::Complete,
            }),
            MockBehavior::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    fn model(&self) -> &str {
        "models/mock"
    }
}
