//! Session handling and chat turns.
//!
//! Sessions are identity-only: creating one returns a ULID the client
//! echoes back on every turn. No per-session history is kept, each turn
//! is answered from the message text alone.

use std::collections::HashSet;
use std::sync::RwLock;

use crate::present::{self, DisplayItem};
use crate::search::SearchService;

/// Opening message, also used as the reply to an empty chat turn.
pub const GREETING_TEXT: &str =
    "안녕하세요! 레스토랑 추천 챗봇입니다. 어떤 음식이 드시고 싶으신가요?";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

/// The chat front of the search pipeline. One instance serves all
/// sessions.
pub struct ChatService {
    search: SearchService,
    sessions: RwLock<HashSet<String>>,
    default_limit: usize,
}

impl ChatService {
    pub fn new(search: SearchService, default_limit: usize) -> Self {
        Self {
            search,
            sessions: RwLock::new(HashSet::new()),
            default_limit,
        }
    }

    /// Register a fresh session and return its id.
    pub fn create_session(&self) -> String {
        let id = rusty_ulid::generate_ulid_string();
        self.sessions.write().unwrap().insert(id.clone());
        log::debug!("session {} created", id);
        id
    }

    pub fn greet(&self) -> Vec<DisplayItem> {
        vec![DisplayItem::message(GREETING_TEXT)]
    }

    /// Answer one chat turn.
    ///
    /// A blank message re-greets; anything else runs a recommendation
    /// search. Search failures have already degraded to an empty result
    /// list, so the only error left is an unknown session id.
    pub fn handle_turn(&self, session_id: &str, text: &str) -> Result<Vec<DisplayItem>, ChatError> {
        if !self.sessions.read().unwrap().contains(session_id) {
            return Err(ChatError::UnknownSession(session_id.to_string()));
        }

        if text.trim().is_empty() {
            return Ok(self.greet());
        }

        let results = self.search.recommend(text, self.default_limit);
        Ok(present::present(&results))
    }
}
