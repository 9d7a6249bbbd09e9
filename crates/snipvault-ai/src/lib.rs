//! # snipvault-ai
//!
//! AI-assisted snippet metadata: explanations, tag suggestion, analysis,
//! optimization review, security scanning, and cross-language conversion,
//! all driven through a pluggable completion backend with defensive
//! parsing of model replies.

pub mod detect;
pub mod mock;
pub mod openai;
pub mod orchestrator;
pub mod parse;

pub use detect::{detect_language, UNKNOWN_LANGUAGE};
pub use mock::MockCompletionBackend;
pub use openai::OpenAiBackend;
pub use orchestrator::{AiOrchestrator, ANALYSIS_FALLBACK, EXPLAIN_FALLBACK};
pub use parse::{extract_json, extract_typed, split_tags};

// Re-export the backend trait
pub use snipvault_core::CompletionBackend;
