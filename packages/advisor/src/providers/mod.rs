//! Chat provider abstraction and implementations.
//!
//! The advisory service talks to its hosted model through this trait so
//! the degradation logic and transcripts stay provider-agnostic.

pub mod gemini;

use crate::AdvisorError;

/// One prior turn in a session transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// `"user"` or `"model"`.
    pub role: String,
    /// The turn's text.
    pub text: String,
}

impl ChatTurn {
    /// A user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            text: text.into(),
        }
    }

    /// A model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            text: text.into(),
        }
    }
}

/// A conversational answer service.
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    /// Submits the system prompt, prior turns, and the new user message
    /// and returns the model's textual answer.
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError`] if the provider call or response
    /// decoding fails.
    async fn ask(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<String, AdvisorError>;
}
