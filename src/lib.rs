//! relay-bot - command parsing and dispatch for chat platforms
//!
//! The core is the command bus: it recognizes a leading `/command` token in
//! free-form message text, resolves it against a registry of handlers,
//! invokes the match, and hands the update back to the caller. Adapters for
//! Telegram and the console feed it events and carry replies.

pub mod application;
pub mod domain;
pub mod infrastructure;
