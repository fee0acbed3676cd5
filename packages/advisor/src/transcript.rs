//! In-memory session transcripts.
//!
//! Each chat session owns its own transcript, keyed by session id.
//! Mutation goes through one `Mutex` so concurrent exchanges can't
//! interleave half-written turns. Transcripts live for the process
//! lifetime; nothing is persisted.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::providers::ChatTurn;

/// Session-keyed transcript store.
pub struct TranscriptStore {
    sessions: Mutex<BTreeMap<String, Vec<ChatTurn>>>,
}

impl TranscriptStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    /// A snapshot of one session's turns, oldest first.
    #[must_use]
    pub fn history(&self, session_id: &str) -> Vec<ChatTurn> {
        self.sessions
            .lock()
            .expect("transcript mutex poisoned")
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Appends one user/model exchange to a session, creating the
    /// session on first use.
    pub fn append_exchange(&self, session_id: &str, user_text: &str, model_text: &str) {
        let mut sessions = self.sessions.lock().expect("transcript mutex poisoned");
        let transcript = sessions.entry(session_id.to_string()).or_default();
        transcript.push(ChatTurn::user(user_text));
        transcript.push(ChatTurn::model(model_text));
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .expect("transcript mutex poisoned")
            .len()
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}
