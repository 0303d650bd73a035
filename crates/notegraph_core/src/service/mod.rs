//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod chat_service;
pub mod note_service;
