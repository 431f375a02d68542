//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and statistics into use-case APIs.
//! - Keep the presentation layer decoupled from storage details.

pub mod tracker;
