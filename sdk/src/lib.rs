//! Persona SDK
//!
//! Shared library providing the content model, the content store trait and
//! the error taxonomy. This crate is used by the engine and by anything that
//! produces or serves quiz content.

/// Content bundle types
pub mod bundle;

/// Content store trait
pub mod content_store;

/// Error types and handling
pub mod errors;

/// Quiz content types
pub mod types;

// Re-export commonly used types
pub use bundle::{ContentBundle, LocaleContent};
pub use content_store::{ContentStore, RawSettings};
pub use errors::{EngineError, PersonaErrorExt};
pub use types::{Outcome, Prompt, Question, QuizIntro};
