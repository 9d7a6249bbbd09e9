//! # snipvault-search
//!
//! Composite search over the snippet store: free-text substring matching,
//! tag membership, and language membership, ANDed across classes and ORed
//! within the tag and language sets.

pub mod engine;
pub mod filters;

pub use engine::SnippetSearchEngine;
pub use filters::NormalizedFilters;

// Re-export core types
pub use snipvault_core::SearchFilters;
