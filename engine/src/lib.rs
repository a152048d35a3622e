//! Persona Engine Library
//!
//! Turn engine for a personality quiz played over a conversational platform.
//! It is used by both the `persona` binary and integration tests.

/// Canvas slide composition
pub mod canvas;

/// CLI interface module
pub mod cli;

/// Configuration management module
pub mod config;

/// Quiz content access
pub mod content;

/// Per-turn conversation context and platform wire format
pub mod conversation;

/// Surface selection for voice, chat and canvas devices
pub mod dispatch;

/// Dialogue handlers for every action
pub mod fulfillment;

/// Command handlers module
pub mod handlers;

/// Quiz scoring and question selection
pub mod quiz;

/// One-turn executor with error recovery
pub mod runner;

/// Fulfillment webhook server
pub mod server;

/// Session record persisted in the platform's parameter bag
pub mod session;

/// SSML helpers
pub mod ssml;

/// Telemetry and Observability
pub mod telemetry;
