//! LLM provider integration for mindline
//!
//! [`ChatCompletionsClient`] speaks the OpenAI-style chat completions
//! protocol. [`SupportClient`] sits on top of any [`LLMProvider`], injects
//! the support system prompt and turns every failure into a fixed,
//! user-safe reply.

pub mod base;
pub mod completions;
pub mod prompt;
pub mod support;

pub use base::{LLMProvider, LLMResponse, Message, ProviderError, ProviderResult};
pub use completions::{ChatCompletionsClient, SamplingParams};
pub use prompt::{ensure_system_prompt, MENTAL_HEALTH_SYSTEM_PROMPT};
pub use support::{FallbackKind, ReplyOutcome, SupportClient};
