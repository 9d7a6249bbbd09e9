//! Shared application state.

use std::net::IpAddr;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::RateLimiter;

use snipvault_ai::AiOrchestrator;
use snipvault_db::Database;
use snipvault_search::SnippetSearchEngine;

use crate::error::ApiError;

/// Per-client-IP rate limiter for the AI routes.
pub type AiRateLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub search: SnippetSearchEngine,
    /// None when no API key is configured; AI routes answer 503.
    pub ai: Option<AiOrchestrator>,
    /// None when AI rate limiting is disabled.
    pub ai_limiter: Option<Arc<AiRateLimiter>>,
}

impl AppState {
    /// The orchestrator, or a 503 when AI is not configured.
    pub fn require_ai(&self) -> Result<&AiOrchestrator, ApiError> {
        self.ai.as_ref().ok_or_else(|| {
            ApiError::ServiceUnavailable("AI service is not configured".to_string())
        })
    }

    /// Enforce the per-IP AI quota for one request.
    pub fn check_ai_quota(&self, client_ip: IpAddr) -> Result<(), ApiError> {
        if let Some(limiter) = &self.ai_limiter {
            if limiter.check_key(&client_ip).is_err() {
                return Err(ApiError::TooManyRequests(
                    "Too many AI requests from this IP, please try again later.".to_string(),
                ));
            }
        }
        Ok(())
    }
}
