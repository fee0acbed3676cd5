#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Conversational farm advisory backed by a hosted language model.
//!
//! The advisory surface never errors toward the caller: a missing
//! credential yields a fixed offline message without any network call,
//! `exit`/`quit` short-circuit to an exit acknowledgement, and any
//! provider failure degrades to a fixed apology. Transcripts are kept
//! per session in an in-memory store so concurrent callers don't read
//! each other's conversations.

pub mod providers;
pub mod reference;
pub mod transcript;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::providers::ChatProvider;
use crate::transcript::TranscriptStore;

/// Returned when no provider credential is configured.
pub const OFFLINE_RESPONSE: &str = "AI Advisor is offline. Please check API key configuration.";
/// Returned for `exit`/`quit` inputs.
pub const EXIT_RESPONSE: &str = "Exiting chat...";
/// Returned when the provider call fails.
pub const APOLOGY_RESPONSE: &str =
    "Sorry, I ran into a network or API error while processing your request.";

/// Errors from chat provider calls.
///
/// These never escape [`AdvisoryService::answer`]; they exist so the
/// providers can report precisely and the service can log before
/// degrading.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },
}

/// The advisory adapter: provider + transcript store + grounding.
pub struct AdvisoryService {
    provider: Option<Arc<dyn ChatProvider>>,
    store: TranscriptStore,
    system_prompt: String,
}

impl AdvisoryService {
    /// Creates the service. Pass `None` when no credential is
    /// configured; the service then answers offline without ever
    /// touching the network.
    #[must_use]
    pub fn new(provider: Option<Arc<dyn ChatProvider>>) -> Self {
        Self {
            provider,
            store: TranscriptStore::new(),
            system_prompt: reference::system_prompt(),
        }
    }

    /// Whether a provider is configured.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.provider.is_some()
    }

    /// Answers a user message in the context of one session's
    /// transcript and the supplied farm profile. Never fails — every
    /// degraded path has a fixed textual answer.
    pub async fn answer(
        &self,
        session_id: &str,
        message: &str,
        profile: &BTreeMap<String, serde_json::Value>,
    ) -> String {
        let trimmed = message.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            return EXIT_RESPONSE.to_string();
        }

        let Some(provider) = &self.provider else {
            return OFFLINE_RESPONSE.to_string();
        };

        let combined = combine(message, profile);
        let history = self.store.history(session_id);

        match provider.ask(&self.system_prompt, &history, &combined).await {
            Ok(answer) => {
                self.store.append_exchange(session_id, &combined, &answer);
                answer
            }
            Err(e) => {
                log::error!("advisory provider call failed: {e}");
                APOLOGY_RESPONSE.to_string()
            }
        }
    }
}

/// Renders the structured profile into readable text and appends it to
/// the message.
fn combine(message: &str, profile: &BTreeMap<String, serde_json::Value>) -> String {
    if profile.is_empty() {
        return message.to_string();
    }
    let mut rendered = String::from("User field data:\n");
    for (key, value) in profile {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        rendered.push_str(&format!("- {key}: {value}\n"));
    }
    format!("{message}\n\n{rendered}")
}
