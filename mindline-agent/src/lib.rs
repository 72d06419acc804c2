//! Conversation logic for mindline
//!
//! This crate turns posted user text into stored turns: it projects the
//! stored transcript for the inference backend and drives one reply per post.

pub mod context;
pub mod controller;

pub use context::ContextBuilder;
pub use controller::{ConversationController, Identity, PostedReply};
