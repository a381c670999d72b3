use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::RwLock;

use crate::database::Database;
use crate::models::ChatSession;

type SessionMap = Arc<RwLock<HashMap<ChatId, ChatSession>>>;

/// Shared handler state: the backend connection plus the in-memory
/// conversation state. Sessions are never persisted — the backend is the
/// only source of truth, and chat history lives for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    sessions: SessionMap,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns a copy of the chat's session, creating it (with the
    /// assistant greeting) on first contact.
    pub async fn session(&self, chat_id: ChatId) -> ChatSession {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&chat_id) {
                return session.clone();
            }
        }

        let session = ChatSession::new();
        let mut sessions = self.sessions.write().await;
        sessions.entry(chat_id).or_insert_with(|| session.clone());
        session
    }

    pub async fn save_session(&self, chat_id: ChatId, session: ChatSession) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(chat_id, session);
    }

    pub async fn clear_draft(&self, chat_id: ChatId) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(&chat_id) {
            session.draft = None;
        }
    }
}
