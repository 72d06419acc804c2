//! Session management for conversation history
//!
//! Sessions hold the ordered transcript of one conversation in memory.
//! Nothing here touches disk: a restart discards every session.

pub mod manager;
pub mod store;

pub use manager::{SessionHandle, SessionStore};
pub use store::{ChatMessage, Session, ROLE_ASSISTANT, ROLE_USER};
