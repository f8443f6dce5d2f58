//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into UI-facing APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod notes_service;
