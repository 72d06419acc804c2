//! Conversation controller: one posted message in, one stored turn out

use std::sync::Arc;

use mindline_core::session::{ChatMessage, SessionStore};
use mindline_core::{Error, Result};
use mindline_providers::SupportClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::ContextBuilder;

/// An authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub name: String,
}

impl Identity {
    pub fn new(user_id: i64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

/// Result of posting one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedReply {
    /// Assistant reply text, possibly a fallback string
    pub reply_text: String,
    /// Id of the stored assistant message
    pub reply_id: String,
    /// Session the turn was stored in; callers persist it for the next post
    pub session_id: String,
}

/// Drives each conversation turn against the session store and the
/// support client
pub struct ConversationController {
    sessions: Arc<SessionStore>,
    responder: Arc<SupportClient>,
    context: ContextBuilder,
}

impl ConversationController {
    pub fn new(sessions: Arc<SessionStore>, responder: Arc<SupportClient>) -> Self {
        Self {
            sessions,
            responder,
            context: ContextBuilder::new(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Store `text` as a user message, fetch a reply and store it.
    ///
    /// A new session is minted when `session_hint` is `None`. The session
    /// stays locked from the user append to the assistant append, so
    /// concurrent posts to one session are stored turn by turn.
    pub async fn post_message(
        &self,
        identity: Option<&Identity>,
        session_hint: Option<&str>,
        text: &str,
    ) -> Result<PostedReply> {
        let identity = require_identity(identity)?;

        let session_id = match session_hint {
            Some(id) => id.to_string(),
            None => self.sessions.create_session(),
        };

        let handle = self.sessions.get_or_create(&session_id);
        let mut session = handle.lock().await;

        session.push(ChatMessage::user(text));
        let transcript = self.context.build_messages(&session.messages);
        debug!(
            user_id = identity.user_id,
            session_id = %session_id,
            "Requesting reply for {} stored messages",
            transcript.len()
        );

        let reply_text = self.responder.get_reply(transcript).await;

        let reply = ChatMessage::assistant(reply_text.clone());
        let reply_id = reply.id.clone();
        session.push(reply);

        Ok(PostedReply {
            reply_text,
            reply_id,
            session_id,
        })
    }

    /// Start a fresh, empty session and return its id.
    ///
    /// The previous session is left in the store.
    pub async fn reset(&self, identity: Option<&Identity>) -> Result<String> {
        let identity = require_identity(identity)?;
        let session_id = self.sessions.create_session();
        info!(user_id = identity.user_id, session_id = %session_id, "Started new chat");
        Ok(session_id)
    }

    /// Stored transcript of the active session; empty when there is none
    pub async fn get_history(
        &self,
        identity: Option<&Identity>,
        session_hint: Option<&str>,
    ) -> Result<Vec<ChatMessage>> {
        require_identity(identity)?;
        match session_hint {
            Some(id) => Ok(self.sessions.list(id).await),
            None => Ok(Vec::new()),
        }
    }
}

fn require_identity(identity: Option<&Identity>) -> Result<&Identity> {
    identity.ok_or(Error::Unauthenticated)
}
