//! # snipvault-core
//!
//! Core types, traits, and abstractions for snipvault.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other snipvault crates depend on.

pub mod error;
pub mod logging;
pub mod models;
pub mod tags;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use tags::{normalize_tags, normalize_tags_with_language};
pub use traits::*;
