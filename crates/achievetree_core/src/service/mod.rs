//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, history, layout, camera and codec into editor
//!   use-cases.
//! - Keep host/UI layers decoupled from the individual engines.

pub mod editor_session;
