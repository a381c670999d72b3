use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::forms::{GeneralBookingForm, LaundryBookingForm};
use crate::models::ServiceProvider;

pub const ASSISTANT_GREETING: &str =
    "Hello! I'm Habi, your personal service assistant. I can help you find and \
     book local professionals. What home service do you need today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in the in-memory conversation. Never synchronized to the
/// backend; the assistant may attach the providers it matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub providers: Vec<ServiceProvider>,
    pub category: Option<String>,
}

impl ChatMessage {
    pub fn user(text: String) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn assistant(text: String) -> Self {
        Self::new(Sender::Assistant, text)
    }

    fn new(sender: Sender, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text,
            timestamp: Utc::now(),
            providers: Vec::new(),
            category: None,
        }
    }

    pub fn with_providers(mut self, providers: Vec<ServiceProvider>, category: Option<String>) -> Self {
        self.providers = providers;
        self.category = category;
        self
    }
}

/// The booking form currently being filled in, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BookingDraft {
    General(GeneralBookingForm),
    Laundry(LaundryBookingForm),
}

/// Per-chat conversation state, owned by the shared state map and handed
/// explicitly into the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub draft: Option<BookingDraft>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(ASSISTANT_GREETING.to_string())],
            draft: None,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
