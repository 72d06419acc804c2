//! Context builder for assembling the upstream transcript

use mindline_core::session::{ChatMessage, ROLE_ASSISTANT, ROLE_USER};
use mindline_providers::Message;

/// Builds the role-tagged transcript sent to the inference backend
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextBuilder;

impl ContextBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Project stored messages to role-tagged pairs, preserving order.
    ///
    /// The system instruction is not added here; the support client
    /// prepends it when the transcript does not already start with one.
    pub fn build_messages(&self, history: &[ChatMessage]) -> Vec<Message> {
        history.iter().map(to_message).collect()
    }
}

fn to_message(message: &ChatMessage) -> Message {
    match message.role() {
        ROLE_USER => Message::user(message.content.clone()),
        ROLE_ASSISTANT => Message::assistant(message.content.clone()),
        other => Message {
            role: other.to_string(),
            content: message.content.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_messages_maps_roles_in_order() {
        let history = vec![
            ChatMessage::user("I can't sleep"),
            ChatMessage::assistant("How long has this been going on?"),
            ChatMessage::user("A few weeks"),
        ];

        let messages = ContextBuilder::new().build_messages(&history);

        assert_eq!(
            messages,
            vec![
                Message::user("I can't sleep"),
                Message::assistant("How long has this been going on?"),
                Message::user("A few weeks"),
            ]
        );
    }

    #[test]
    fn test_build_messages_empty_history() {
        assert!(ContextBuilder::new().build_messages(&[]).is_empty());
    }
}
