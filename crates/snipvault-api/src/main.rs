//! snipvault API server entry point.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snipvault_ai::{AiOrchestrator, OpenAiBackend};
use snipvault_api::{build_router, AppState};
use snipvault_core::CollectionRepository;
use snipvault_db::Database;
use snipvault_search::SnippetSearchEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "snipvault_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "snipvault_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("snipvault-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/snipvault".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    // AI rate limiting configuration, applied per client IP
    // AI_RATE_LIMIT_REQUESTS: requests per window (default: 20)
    // AI_RATE_LIMIT_WINDOW_SECS: window in seconds (default: 900 = 15 minutes)
    let ai_rate_limit_requests: u32 = std::env::var("AI_RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| "20".to_string())
        .parse()
        .unwrap_or(20);
    let ai_rate_limit_window_secs: u64 = std::env::var("AI_RATE_LIMIT_WINDOW_SECS")
        .unwrap_or_else(|_| "900".to_string())
        .parse()
        .unwrap_or(900);
    let ai_rate_limit_enabled: bool = std::env::var("AI_RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "AI rate limiting: {} ({} requests per {} seconds per IP)",
        if ai_rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        ai_rate_limit_requests,
        ai_rate_limit_window_secs
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // The default collection must exist before any delete can reassign to it
    let default_collection = db.collections.ensure_default().await?;
    info!(
        collection_id = %default_collection.id,
        "Default collection ready"
    );

    // Create search engine
    let search = SnippetSearchEngine::new(db.pool.clone());

    // Completion backend is optional: without OPENAI_API_KEY the AI routes
    // answer 503 and everything else works normally
    let ai = match OpenAiBackend::from_env()? {
        Some(backend) => {
            let orchestrator = AiOrchestrator::new(Arc::new(backend));
            info!(model = orchestrator.model_name(), "AI backend initialized");
            Some(orchestrator)
        }
        None => {
            info!("OPENAI_API_KEY not set, AI routes disabled");
            None
        }
    };

    // Create AI rate limiter if enabled. The quota replenishes evenly
    // across the window with the full window available as burst.
    let ai_limiter = if ai_rate_limit_enabled {
        let requests = NonZeroU32::new(ai_rate_limit_requests.max(1))
            .expect("requests clamped to at least 1");
        let replenish_secs = (ai_rate_limit_window_secs / u64::from(requests.get())).max(1);
        let quota = Quota::with_period(std::time::Duration::from_secs(replenish_secs))
            .expect("Rate limit period must be non-zero")
            .allow_burst(requests);
        Some(Arc::new(RateLimiter::keyed(quota)))
    } else {
        None
    };

    let state = AppState {
        db,
        search,
        ai,
        ai_limiter,
    };

    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
