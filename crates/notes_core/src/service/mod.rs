//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into presentation-facing operations.
//! - Keep UI layers decoupled from storage details.

pub mod notes_controller;
