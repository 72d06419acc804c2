//! Core types and shared state for mindline
//!
//! This crate provides the error type, configuration handling, logging
//! setup and the in-memory session store used by the other mindline
//! components.

pub mod config;
pub mod error;
pub mod logging;
pub mod session;

pub use error::{Error, Result};
