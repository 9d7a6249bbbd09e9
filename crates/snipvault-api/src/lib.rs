//! # snipvault-api
//!
//! HTTP API server for snipvault: snippet and collection CRUD, composite
//! search, and rate-limited AI routes.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use state::{AiRateLimiter, AppState};
