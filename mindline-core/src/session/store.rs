//! Session data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tag for user-authored messages in a transcript
pub const ROLE_USER: &str = "user";
/// Role tag for assistant replies in a transcript
pub const ROLE_ASSISTANT: &str = "assistant";

/// A conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session identifier
    pub id: String,
    /// Messages in insertion order
    pub messages: Vec<ChatMessage>,
    /// Session creation time
    pub created_at: DateTime<Utc>,
    /// Last append time
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new, empty session
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message to the end of the transcript
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been stored yet
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// A chat message as stored and as returned by the history endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message id
    pub id: String,
    /// Message text
    pub content: String,
    /// `true` for user messages, `false` for assistant replies
    pub is_user: bool,
    /// Client-supplied timestamp; the server leaves it unset
    pub timestamp: Option<String>,
}

impl ChatMessage {
    fn new(content: impl Into<String>, is_user: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            is_user,
            timestamp: None,
        }
    }

    /// Create a user message with a fresh id
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, true)
    }

    /// Create an assistant message with a fresh id
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, false)
    }

    /// Transcript role for this message
    pub fn role(&self) -> &'static str {
        if self.is_user {
            ROLE_USER
        } else {
            ROLE_ASSISTANT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_creation() {
        let session = Session::new("abc");
        assert_eq!(session.id, "abc");
        assert!(session.is_empty());
    }

    #[test]
    fn test_push_preserves_order() {
        let mut session = Session::new("test");
        session.push(ChatMessage::user("Hello"));
        session.push(ChatMessage::assistant("Hi there!"));

        assert_eq!(session.len(), 2);
        assert_eq!(session.messages[0].role(), "user");
        assert_eq!(session.messages[1].role(), "assistant");
        assert!(session.updated_at >= session.created_at);
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ChatMessage::user("same");
        let b = ChatMessage::user("same");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_message_json_shape() {
        let msg = ChatMessage::user("I feel anxious");
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["content"], "I feel anxious");
        assert_eq!(value["is_user"], true);
        assert!(value["timestamp"].is_null());
        assert!(value["id"].is_string());
        assert_eq!(value.as_object().unwrap().len(), 4);
    }
}
