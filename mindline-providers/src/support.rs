//! Support-assistant reply client
//!
//! Wraps a provider so callers always get text back: failures are logged
//! and replaced by one of three fixed replies.

use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::base::{LLMProvider, Message, ProviderError};
use crate::prompt::{ensure_system_prompt, MENTAL_HEALTH_SYSTEM_PROMPT};

/// Why a canned reply was substituted for a model reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    /// No API key is configured
    ConfigurationMissing,
    /// The endpoint answered with a non-200 status
    RequestFailed,
    /// Transport failure or an unusable response body
    GenericError,
}

impl FallbackKind {
    /// The user-facing reply for this failure class
    pub fn message(self) -> &'static str {
        match self {
            FallbackKind::ConfigurationMissing => {
                "I'm sorry, but I can't connect to my knowledge base right now. Please try again later."
            }
            FallbackKind::RequestFailed => {
                "I'm sorry, but I'm having trouble processing your request right now. Please try again later."
            }
            FallbackKind::GenericError => {
                "I'm sorry, but I encountered an error while processing your request. Please try again later."
            }
        }
    }

    /// Classify a provider error
    pub fn from_error(err: &ProviderError) -> Self {
        match err {
            ProviderError::MissingCredentials => FallbackKind::ConfigurationMissing,
            ProviderError::ApiError { .. } => FallbackKind::RequestFailed,
            ProviderError::HttpError(_)
            | ProviderError::JsonError(_)
            | ProviderError::InvalidResponse(_) => FallbackKind::GenericError,
        }
    }
}

/// Outcome of one reply attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Reply(String),
    Fallback(FallbackKind),
}

impl ReplyOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ReplyOutcome::Fallback(_))
    }

    /// The text shown to the user
    pub fn into_text(self) -> String {
        match self {
            ReplyOutcome::Reply(text) => text,
            ReplyOutcome::Fallback(kind) => kind.message().to_string(),
        }
    }
}

/// Turns a transcript into a single assistant reply
pub struct SupportClient {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
}

impl SupportClient {
    /// Create a client using the built-in support system prompt
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            system_prompt: MENTAL_HEALTH_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// The transcript exactly as it will be sent upstream
    pub fn prepare_transcript(&self, transcript: Vec<Message>) -> Vec<Message> {
        ensure_system_prompt(transcript, &self.system_prompt)
    }

    /// Ask the provider for a reply, keeping the failure class visible
    pub async fn try_reply(&self, transcript: Vec<Message>) -> ReplyOutcome {
        let messages = self.prepare_transcript(transcript);

        match self.provider.chat(messages).await {
            Ok(response) => match response.content {
                Some(content) => {
                    debug!(
                        "Received reply from {} ({} chars)",
                        self.provider.get_default_model(),
                        content.chars().count()
                    );
                    ReplyOutcome::Reply(content)
                }
                None => {
                    error!("Inference response carried no message content");
                    ReplyOutcome::Fallback(FallbackKind::GenericError)
                }
            },
            Err(err) => {
                let kind = FallbackKind::from_error(&err);
                match kind {
                    FallbackKind::ConfigurationMissing => {
                        warn!("Inference API key not configured; replying with fallback")
                    }
                    FallbackKind::RequestFailed => error!("Inference request failed: {}", err),
                    FallbackKind::GenericError => error!("Error calling inference API: {}", err),
                }
                ReplyOutcome::Fallback(kind)
            }
        }
    }

    /// Ask for a reply; never fails, substituting a fixed text on error
    pub async fn get_reply(&self, transcript: Vec<Message>) -> String {
        self.try_reply(transcript).await.into_text()
    }
}
